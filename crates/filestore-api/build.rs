fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    println!("cargo:rerun-if-changed=proto/filestore.proto");
    tonic_build::configure()
        .bytes(["."])
        .compile_protos(&["proto/filestore.proto"], &["proto"])?;
    Ok(())
}
