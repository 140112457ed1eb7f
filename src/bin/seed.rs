use video_api::build_store;
use video_api::config::Config;
use video_api::error::StartupError;
use video_api::helpers::seed::seed;
use video_api::telemetry::init_logger_once;

fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    let store = build_store(&config)?;
    let summary = seed(store.as_ref())?;

    println!("Created {} users", summary.users);
    println!("Created {} videos", summary.videos);
    println!("Created {} meta items", summary.meta_items);
    println!("Created {} interactions", summary.interactions);

    for username in ["john_doe", "jane_smith", "bob_wilson", "alice_johnson"] {
        if let Some(user) = store.find_user_by_username(username)? {
            println!("  {:>4}  {}", user.id, user.username);
        }
    }

    Ok(())
}

fn main() {
    dotenv::dotenv().ok();
    init_logger_once();

    if let Err(e) = run() {
        tracing::error!("Seeding failed: {}", e);
        std::process::exit(1);
    }
}
