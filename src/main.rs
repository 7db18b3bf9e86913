use restrun::error::AppResult;

fn main() -> AppResult<()> {
    restrun::entry::run()
}
