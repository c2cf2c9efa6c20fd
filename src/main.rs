// This stub only parses the command line; all the work happens in the library
// so that it can be tested without spawning the binary.
fn main() -> anyhow::Result<()> {
    chat_timeline::inspect::app_main()
}
