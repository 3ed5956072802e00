fn main() {
    println!("cargo:rerun-if-env-changed=KATARAIN_BUILD");
    println!("cargo:rerun-if-env-changed=RUSTFLAGS");

    let build_id = match std::env::var("KATARAIN_BUILD") {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => infer_build_id(),
    };

    println!("cargo:rustc-env=KATARAIN_BUILD={}", build_id);
}

fn infer_build_id() -> String {
    let os_raw = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".to_string());
    let os = match os_raw.as_str() {
        "macos" => "darwin",
        other => other,
    };

    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    format!("{os}-{arch}-{profile}")
}
