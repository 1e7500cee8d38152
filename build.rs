fn main() {
    // Only compile Windows resources on Windows target
    #[cfg(target_os = "windows")]
    {
        // Version info for the demo binary
        let _ = embed_resource::compile("resources/windows/resources.rc", embed_resource::NONE);
    }
}
