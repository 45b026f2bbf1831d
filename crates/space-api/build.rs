fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("CARGO_FEATURE_GRPC").is_none() {
        return Ok(());
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(&["proto/dra.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/dra.proto");
    Ok(())
}
