use cadence::error::AppResult;

fn main() -> AppResult<()> {
    cadence::entry::run()
}
