//! Console collaborator: single-key command input and status output.

use std::io::{self, Read, Write};
use std::thread;

use anyhow::{Context, Result};
use hookline_core::dump::ReportDump;
use hookline_core::{CallObserver, Command, Origin, ReportType, Transition, VolumeDirection};
use tokio::sync::mpsc;
use tracing::debug;

/// Start a thread forwarding every byte typed on stdin.
///
/// The thread is detached; it ends at EOF or with the process.
pub fn spawn_key_reader() -> Result<mpsc::UnboundedReceiver<char>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(char::from(byte)).is_err() {
                    break;
                }
            }
            debug!("Console input closed");
        })
        .context("Failed to start console input thread")?;
    Ok(rx)
}

/// Prints call-state transitions the way an operator reads them:
/// `-->` for headset-initiated changes, `<--` for commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl CallObserver for ConsoleObserver {
    fn notify(&self, transition: Transition) {
        print_line(&describe(transition));
    }
}

/// Status line for a transition.
pub fn describe(transition: Transition) -> String {
    match transition {
        Transition::Hook { off_hook, origin: Origin::Device } => {
            format!("--> {}", if off_hook { "Hook lifted" } else { "Hook in place" })
        }
        Transition::Hook { off_hook, origin: Origin::User } => {
            format!("<-- {}", if off_hook { "Lift Hook" } else { "Put back Hook" })
        }
        Transition::Mute { muted, origin: Origin::Device } => {
            format!("--> {}", if muted { "Muted" } else { "Unmuted" })
        }
        Transition::Mute { muted, origin: Origin::User } => {
            format!("<-- {}", if muted { "Mute" } else { "Unmute" })
        }
        Transition::Ringer { ringing, origin } => {
            format!("{} {}", arrow(origin), if ringing { "Ring" } else { "Stop ring" })
        }
        Transition::RingCancelled { origin } => format!("{} Ring cancelled", arrow(origin)),
        Transition::Volume { direction: VolumeDirection::Up, value } => {
            format!("Volume increment = 0x{value:x}")
        }
        Transition::Volume { direction: VolumeDirection::Down, value } => {
            format!("Volume decrement = 0x{value:x}")
        }
    }
}

fn arrow(origin: Origin) -> &'static str {
    match origin {
        Origin::Device => "-->",
        Origin::User => "<--",
    }
}

pub fn print_help() {
    let mut text = String::from("Usage:\n");
    for command in Command::ALL {
        text.push_str(&format!(" {} = {}\n", command.key(), command.description()));
    }
    print_block(&text);
}

pub fn print_reports(reports: &[(ReportType, Vec<ReportDump>)]) {
    let mut text = String::new();
    for (report_type, dumps) in reports {
        text.push_str(&format!("\n*** {}:\n", report_type.name()));
        for dump in dumps {
            text.push_str(&dump.to_string());
        }
    }
    print_block(&text);
}

fn print_line(line: &str) {
    print_block(&format!("{line}\n"));
}

fn print_block(text: &str) {
    let mut out = io::stdout().lock();
    // stdout closed: nothing left to tell
    let _ = out.write_all(text.as_bytes()).and_then(|()| out.flush());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_device_transitions() {
        assert_eq!(
            describe(Transition::Hook { off_hook: true, origin: Origin::Device }),
            "--> Hook lifted"
        );
        assert_eq!(
            describe(Transition::Hook { off_hook: false, origin: Origin::Device }),
            "--> Hook in place"
        );
        assert_eq!(describe(Transition::Mute { muted: false, origin: Origin::Device }), "--> Unmuted");
    }

    #[test]
    fn test_describe_user_transitions() {
        assert_eq!(describe(Transition::Hook { off_hook: false, origin: Origin::User }), "<-- Put back Hook");
        assert_eq!(describe(Transition::Mute { muted: true, origin: Origin::User }), "<-- Mute");
        assert_eq!(describe(Transition::Ringer { ringing: true, origin: Origin::User }), "<-- Ring");
    }

    #[test]
    fn test_describe_volume() {
        assert_eq!(
            describe(Transition::Volume { direction: VolumeDirection::Up, value: 1 }),
            "Volume increment = 0x1"
        );
    }
}
