fn main() {
    xvfs_gen::build::embed_directory("assets", "example").expect("Failed to embed assets");
}
