fn main() {
    // Credentials are baked in at compile time (see `config::DeviceSecrets`).
    println!("cargo:rerun-if-env-changed=DOORSCALE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=DOORSCALE_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=DOORSCALE_CONNECTION_STRING");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
