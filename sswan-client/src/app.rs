//! Line-oriented terminal front end
//!
//! Reads chat lines from stdin and prints the message feed to stdout.
//! Everything rendered here comes from the session's UI surface: the
//! connected flag, the status line and the feed.

use tokio::io::{AsyncBufReadExt, BufReader};

use sswan_protocol::Envelope;
use sswan_utils::Result;

use crate::connection::Connection;
use crate::session::FeedEntry;

pub async fn run(server_url: String) -> Result<()> {
    let mut conn = Connection::new(server_url);
    println!("sswan — you are {}", conn.session().client_id());

    conn.connect().await?;
    let mut last_status = conn.session().status().to_string();
    println!("* {}", last_status);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = conn.next_event() => {
                let Some(event) = event else { break };

                let seen = conn.session().feed().len();
                let closed = event.is_closed();
                conn.apply(event);

                render_new_entries(conn.session().feed(), seen);
                report_status(&conn, &mut last_status);

                if closed {
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(text) = line? else { break };

                if let Err(e) = conn.send(Envelope::message(text.trim())).await {
                    eprintln!("! {}", e);
                    if !e.is_send_rejection() {
                        break;
                    }
                    report_status(&conn, &mut last_status);
                }
            }
        }
    }

    conn.shutdown().await;
    Ok(())
}

fn report_status(conn: &Connection, last_status: &mut String) {
    let status = conn.session().status().to_string();
    if status != *last_status {
        println!("* {}", status);
        *last_status = status;
    }
}

fn render_new_entries(feed: &[FeedEntry], from: usize) {
    for entry in &feed[from..] {
        match entry {
            FeedEntry::Message(envelope) => {
                let sender = envelope
                    .sender
                    .as_ref()
                    .map(|id| id.short().to_string())
                    .unwrap_or_else(|| "server".into());
                match envelope.payload_text() {
                    Some(text) => println!("[{}] {}", sender, text),
                    None => println!("[{}] {}", sender, envelope.payload),
                }
            }
            FeedEntry::Invalid { raw } => println!("! undecodable frame: {}", raw),
        }
    }
}
