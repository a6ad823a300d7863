//! Console front end: reads one action at a time and prints the session's
//! rendered result, mirroring the buttons of the desktop layout.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use zonelens::core::session::LiveSession;
use zonelens::shared::settings::AppSettings;
use zonelens::shared::types::ConvertCurrencyRequest;
use zonelens::ZoneResolver;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let settings = AppSettings::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load settings: {}", e);
        AppSettings::default()
    });

    let resolver = Arc::new(ZoneResolver::from_alias_file(&settings.alias_file));
    println!("[Main] Zone index ready ({} zones)", resolver.zone_count());

    let mut session = LiveSession::live(resolver);

    println!("=== Time Zone Converter ===");
    println!("Example: 2024-01-15 14:30:00");
    println!("Commands: convert, weather, currency, now, reset, quit");

    let stdin = io::stdin();
    loop {
        let line = match prompt(&stdin, "> ") {
            Some(line) => line,
            None => break,
        };

        match line.as_str() {
            "convert" => {
                let time_str = match prompt(&stdin, "Enter time (YYYY-MM-DD HH:MM:SS): ") {
                    Some(v) => v,
                    None => break,
                };
                let from_zone = match prompt(&stdin, "Enter source timezone (e.g., Europe/Paris): ") {
                    Some(v) if !v.is_empty() => v,
                    Some(_) => settings.preferences.default_from_zone.clone(),
                    None => break,
                };
                let to_zone = match prompt(&stdin, "Enter target timezone (e.g., Asia/Tokyo): ") {
                    Some(v) if !v.is_empty() => v,
                    Some(_) => settings.preferences.default_to_zone.clone(),
                    None => break,
                };
                println!("{}", session.convert(&time_str, &from_zone, &to_zone));
            }
            "weather" => {
                let time_str = match prompt(&stdin, "Enter time (YYYY-MM-DD HH:MM:SS): ") {
                    Some(v) => v,
                    None => break,
                };
                let zone = match prompt(&stdin, "Enter timezone for weather: ") {
                    Some(v) => v,
                    None => break,
                };
                println!("{}", session.weather(&time_str, &zone).await);
            }
            "currency" => {
                let from_zone = match prompt(&stdin, "Enter source timezone: ") {
                    Some(v) => v,
                    None => break,
                };
                let to_zone = match prompt(&stdin, "Enter target timezone: ") {
                    Some(v) => v,
                    None => break,
                };
                let date = match prompt(&stdin, "Rate date (YYYY-MM-DD, blank for latest): ") {
                    Some(v) => v,
                    None => break,
                };
                let request = ConvertCurrencyRequest {
                    amount: "1.0".to_string(),
                    from_zone,
                    to_zone,
                    date: if date.is_empty() { None } else { Some(date) },
                };
                println!("{}", session.currency(&request).await);
            }
            "now" => {
                let (now, zone) = session.now_prefill();
                println!("🕐 {} ({})", now, zone);
            }
            "reset" => {
                session.reset();
                let (bucket, condition) = session.backdrop();
                println!("Reset. Backdrop: {} / {}", bucket.label(), condition.label());
            }
            "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }
}

fn prompt(stdin: &io::Stdin, label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}
