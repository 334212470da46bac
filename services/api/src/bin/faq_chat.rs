//! services/api/src/bin/faq_chat.rs
//!
//! A terminal client for the FAQ assistant. Each line typed is sent with the
//! whole conversation to a running API server and the reply is printed as it
//! streams in. Ctrl-C abandons the reply in progress.
//!
//! Usage: `faq-chat [http://localhost:3000/chat]`

use api_lib::web::protocol::ErrorBody;
use campus_vault_core::chat::{ChatSession, SessionOutcome, APOLOGY};
use campus_vault_core::ports::PortError;
use futures::StreamExt;
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const DEFAULT_URL: &str = "http://localhost:3000/chat";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let client = reqwest::Client::new();
    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("CampusVault FAQ. Ask a question, or an empty line to quit.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(transcript) = session.begin_turn(&line) else {
            break;
        };

        let response = match client
            .post(&url)
            .json(&json!({ "messages": transcript }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                eprintln!("[{}]", e);
                session.fail();
                println!("{}", APOLOGY);
                continue;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            eprintln!("[{}] {}", status.as_u16(), message);
            session.fail();
            println!("{}", APOLOGY);
            continue;
        }

        let cancel = CancellationToken::new();
        let on_ctrl_c = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrl_c.cancel();
            }
        });

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| PortError::Upstream(e.to_string())));
        let mut printed = 0;
        let outcome = session
            .consume(bytes, &cancel, |reply| {
                print!("{}", &reply[printed..]);
                let _ = std::io::stdout().flush();
                printed = reply.len();
            })
            .await;
        watcher.abort();

        match outcome {
            SessionOutcome::Completed => println!(),
            SessionOutcome::Cancelled => println!("\n[stopped]"),
            SessionOutcome::Failed => println!("\n{}", APOLOGY),
        }
    }
    Ok(())
}
