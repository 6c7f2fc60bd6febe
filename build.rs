use cfg_feature_groups;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");

    println!("cargo:rustc-check-cfg=cfg(log, values(\"log_semihosting\", \"log_dummy\", \"log_itm\"))");
    println!("cargo:rustc-check-cfg=cfg(level, values(\"level_debug\", \"level_info\", \"level_error\"))");
    println!("cargo:rustc-check-cfg=cfg(configuration, values(\"configuration_drone\", \"configuration_dev\"))");

    cfg_feature_groups::setup_feature_groups();
}
