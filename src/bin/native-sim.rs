//! Browser stand-in for manual testing
//!
//! Run with: cargo run --bin native-sim -- --text "Dark" --url https://example.com
//! Netflix:  cargo run --bin native-sim -- --netflix --url https://www.netflix.com/title/80100172
//!
//! Spawns the host the way a browser does, sends one framed request on its
//! stdin and prints the framed reply from its stdout.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{bail, Context as _};
use clap::Parser;
use serde_json::{Map, Value};

use calc_bridge::protocol::{keys, read_message, write_message};

#[derive(Parser, Debug)]
#[command(name = "native-sim")]
#[command(about = "Send one native message to calc-bridge and print the reply")]
struct Args {
    /// Host binary (default: calc-bridge next to this binary)
    #[arg(long, value_name = "PATH")]
    host: Option<PathBuf>,

    /// Selected text / page title
    #[arg(long)]
    text: Option<String>,

    /// Source page URL
    #[arg(long)]
    url: Option<String>,

    /// Cover image URL
    #[arg(long = "image-src")]
    image_src: Option<String>,

    /// Title hint (Netflix route)
    #[arg(long)]
    title: Option<String>,

    /// Route through the Netflix scraper
    #[arg(long, conflicts_with = "fsmirror")]
    netflix: bool,

    /// Route through the FSMirror scraper
    #[arg(long)]
    fsmirror: bool,

    /// Send this JSON object verbatim instead of building one
    #[arg(long, value_name = "JSON")]
    raw: Option<String>,
}

fn build_request(args: &Args) -> anyhow::Result<Map<String, Value>> {
    if let Some(raw) = &args.raw {
        return match serde_json::from_str::<Value>(raw).context("--raw is not valid JSON")? {
            Value::Object(map) => Ok(map),
            other => bail!("--raw must be a JSON object, got {}", other),
        };
    }

    let mut request = Map::new();
    let strings = [
        (keys::TEXT, &args.text),
        (keys::URL, &args.url),
        (keys::IMAGE_SRC, &args.image_src),
        (keys::TITLE, &args.title),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            request.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    if args.netflix {
        request.insert(keys::NETFLIX.to_string(), Value::Bool(true));
    }
    if args.fsmirror {
        request.insert(keys::FSMIRROR.to_string(), Value::Bool(true));
    }
    Ok(request)
}

fn default_host() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate native-sim")?;
    let dir = exe.parent().context("native-sim has no parent directory")?;
    Ok(dir.join(format!("calc-bridge{}", std::env::consts::EXE_SUFFIX)))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let host = match &args.host {
        Some(path) => path.clone(),
        None => default_host()?,
    };
    let request = build_request(&args)?;

    println!("=== native-sim ===");
    println!("host: {}", host.display());
    println!("->   {}", Value::Object(request.clone()));

    let mut child = Command::new(&host)
        .arg("chrome-extension://native-sim/")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to start {}", host.display()))?;

    {
        let mut stdin = child.stdin.take().context("Host stdin not captured")?;
        write_message(&mut stdin, &request).context("Failed to send request")?;
        // stdin dropped here: the host sees EOF after the one frame
    }

    let mut stdout = child.stdout.take().context("Host stdout not captured")?;
    let reply: Option<Value> = read_message(&mut stdout).context("Failed to read reply")?;
    let status = child.wait().context("Failed to wait for host")?;

    match reply {
        Some(reply) => println!("<-   {}", reply),
        None => println!("<-   (no reply)"),
    }
    println!("host exited: {}", status);

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request_from_flags() {
        let args = Args::parse_from([
            "native-sim",
            "--netflix",
            "--url",
            "https://www.netflix.com/title/1",
            "--title",
            "Dark",
        ]);
        let request = build_request(&args).unwrap();
        assert_eq!(
            Value::Object(request),
            json!({"netflix": true, "url": "https://www.netflix.com/title/1", "title": "Dark"})
        );
    }

    #[test]
    fn test_build_request_raw() {
        let args = Args::parse_from(["native-sim", "--raw", r#"{"text":"x","extra":1}"#]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.get("extra"), Some(&json!(1)));

        let args = Args::parse_from(["native-sim", "--raw", "[1]"]);
        assert!(build_request(&args).is_err());
    }

    #[test]
    fn test_netflix_and_fsmirror_conflict() {
        assert!(Args::try_parse_from(["native-sim", "--netflix", "--fsmirror"]).is_err());
    }
}
