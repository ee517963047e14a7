//! Terminal chat client: a pass-through of stdin lines to the socket and
//! socket lines to stdout, with a username handshake loop in front.

use log::warn;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;

use rusty_relay::config::ClientConfig;
use rusty_relay::constants::EXIT_COMMAND;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        warn!("Failed to load .env file: {}", e);
    }
    env_logger::init();

    let config = ClientConfig::load();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Enter your username for group chat (or /exit for exit):");
        let username = match stdin.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) | Err(_) => break,
        };
        if username.is_empty() {
            continue;
        }
        if username == EXIT_COMMAND {
            break;
        }

        // One connection per attempt: a rejected name means reconnecting
        // with a fresh socket.
        let stream = match TcpStream::connect(config.addr()).await {
            Ok(stream) => stream,
            Err(e) => {
                eprintln!("Cannot reach server at {}: {}", config.addr(), e);
                break;
            }
        };

        match run_session(stream, &username, &mut stdin).await {
            SessionEnd::NameTaken => println!("User name already used"),
            SessionEnd::Finished => break,
            SessionEnd::ConnectionLost => {
                println!("Server connection lost");
                break;
            }
        }
    }
}

enum SessionEnd {
    NameTaken,
    Finished,
    ConnectionLost,
}

async fn run_session(
    stream: TcpStream,
    username: &str,
    stdin: &mut Lines<BufReader<Stdin>>,
) -> SessionEnd {
    let (read_half, mut write_half) = stream.into_split();
    let mut server_lines = BufReader::new(read_half).lines();

    // Handshake: send the name, then the first reply decides. A line starting
    // with "Welcome" means the registration was accepted.
    if send_line(&mut write_half, username).await.is_err() {
        return SessionEnd::ConnectionLost;
    }
    match server_lines.next_line().await {
        Ok(Some(reply)) if reply.starts_with("Welcome") => println!("{}", reply),
        Ok(Some(_)) | Ok(None) => return SessionEnd::NameTaken,
        Err(_) => return SessionEnd::ConnectionLost,
    }

    loop {
        tokio::select! {
            from_server = server_lines.next_line() => match from_server {
                Ok(Some(line)) => println!("{}", line),
                Ok(None) | Err(_) => return SessionEnd::ConnectionLost,
            },
            from_user = stdin.next_line() => match from_user {
                Ok(Some(line)) => {
                    if send_line(&mut write_half, &line).await.is_err() {
                        return SessionEnd::ConnectionLost;
                    }
                    if line.trim() == EXIT_COMMAND {
                        return SessionEnd::Finished;
                    }
                }
                Ok(None) | Err(_) => {
                    // stdin closed: leave gracefully before exiting
                    let _ = send_line(&mut write_half, EXIT_COMMAND).await;
                    return SessionEnd::Finished;
                }
            },
        }
    }
}

async fn send_line(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    line: &str,
) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
