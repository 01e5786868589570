fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Vendored protoc unless PROTOC is set
    if std::env::var_os("PROTOC").is_none() {
        // SAFETY: build scripts are single-threaded
        unsafe { std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?) };
    }

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/telebridge.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/telebridge.proto");
    Ok(())
}
