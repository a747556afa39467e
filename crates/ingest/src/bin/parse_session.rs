use std::env;
use std::path::Path;

use ingest::parse_session;
use tracker_core::Provider;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: parse_session <claude|codex|gemini> <path>");
        std::process::exit(2);
    }

    let provider = args[1].parse::<Provider>().unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(2);
    });
    let path = Path::new(&args[2]);
    if !path.is_file() {
        eprintln!("not a file: {}", path.display());
        std::process::exit(1);
    }

    let session = parse_session(provider, path);
    match serde_json::to_string_pretty(&session) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("failed to serialize session: {}", err);
            std::process::exit(1);
        }
    }
    if session.messages == 0 {
        std::process::exit(3);
    }
}
