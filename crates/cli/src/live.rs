//! Interactive live-tagging loop: stdin commands and a one-second tick
//! serialized onto a single task.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tagging::{LiveTagger, MatchStatus, Session, SessionStore, SystemClock, TeamSide};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LiveCommand {
    Toggle,
    EndPeriod,
    Finish,
    Undo,
    Team(TeamSide),
    Note(String),
    Shortcut(usize),
    Tag(String),
    Delete(DeleteTarget),
    Adjust(i64),
    Log,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeleteTarget {
    /// 1-based position in the displayed log.
    Position(usize),
    Id(Uuid),
}

pub(crate) fn parse(line: &str) -> Result<LiveCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let cmd = match head.to_lowercase().as_str() {
        "" | "p" | "play" | "pause" | "toggle" => LiveCommand::Toggle,
        "end" => LiveCommand::EndPeriod,
        "finish" => LiveCommand::Finish,
        "u" | "undo" => LiveCommand::Undo,
        "a" => LiveCommand::Team(TeamSide::TeamA),
        "b" => LiveCommand::Team(TeamSide::TeamB),
        "note" => LiveCommand::Note(rest.to_string()),
        "tag" if !rest.is_empty() => LiveCommand::Tag(rest.to_string()),
        "del" | "delete" => {
            if let Ok(n) = rest.parse::<usize>() {
                LiveCommand::Delete(DeleteTarget::Position(n))
            } else if let Ok(id) = Uuid::parse_str(rest) {
                LiveCommand::Delete(DeleteTarget::Id(id))
            } else {
                return Err(format!("expected a log position or tag id, got '{}'", rest));
            }
        }
        "log" => LiveCommand::Log,
        "s" | "status" => LiveCommand::Status,
        "h" | "help" | "?" => LiveCommand::Help,
        "q" | "quit" | "exit" => LiveCommand::Quit,
        h if h.starts_with('+') || h.starts_with('-') => {
            let delta = if h.len() == 1 { Ok(1) } else { h[1..].parse::<i64>() };
            let delta = delta.map_err(|_| format!("bad clock adjustment '{}'", h))?;
            LiveCommand::Adjust(if h.starts_with('-') { -delta } else { delta })
        }
        h => match h.parse::<usize>() {
            Ok(n) => LiveCommand::Shortcut(n),
            Err(_) => return Err(format!("unknown command '{}', try 'help'", h)),
        },
    };
    Ok(cmd)
}

const HELP: &str = "\
  <enter>|p     start / pause / resume
  1..9          tag event button n
  tag <label>   tag event by label or id
  a | b         select team A or B
  note <text>   note for the next tag
  end           end current period
  finish        finish the match
  u             undo last action
  del <n|id>    delete tag (n = position in log)
  +n | -n       adjust display clock
  log | status | help | q";

pub(crate) async fn run(session: Session, store: Box<dyn SessionStore>) -> Result<Session> {
    let mut tagger = LiveTagger::new(session, Arc::new(SystemClock), store);
    let mut ticker: Option<Interval> = None;
    let mut team = TeamSide::TeamA;
    let mut note: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_buttons(&tagger);
    print_status(&tagger, team);

    loop {
        tokio::select! {
            _ = next_tick(&mut ticker) => tagger.tick(),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse(&line) {
                    Ok(LiveCommand::Quit) => break,
                    Ok(cmd) => apply(&mut tagger, cmd, &mut team, &mut note),
                    Err(msg) => println!("! {}", msg),
                }
            }
        }
        sync_ticker(&tagger, &mut ticker);
    }

    if tagger.is_dirty() {
        tagger.flush()?;
    }
    Ok(tagger.into_session())
}

fn apply(tagger: &mut LiveTagger, cmd: LiveCommand, team: &mut TeamSide, note: &mut Option<String>) {
    let outcome: Result<(), String> = match cmd {
        LiveCommand::Toggle => tagger.toggle().map(|_| ()).map_err(|e| e.to_string()),
        LiveCommand::EndPeriod => tagger.end_period().map(|tag| println!("  {}", tag.event_label)).map_err(|e| e.to_string()),
        LiveCommand::Finish => tagger.finish().map_err(|e| e.to_string()),
        LiveCommand::Undo => {
            if !tagger.undo() {
                println!("  nothing to undo");
            }
            Ok(())
        }
        LiveCommand::Team(side) => {
            *team = side;
            Ok(())
        }
        LiveCommand::Note(text) => {
            *note = Some(text).filter(|t| !t.is_empty());
            Ok(())
        }
        LiveCommand::Shortcut(n) => {
            let result = tagger.tag_shortcut(n, *team, note.as_deref());
            report_tag(result, note)
        }
        LiveCommand::Tag(key) => {
            let result = tagger.tag_event(&key, *team, note.as_deref());
            report_tag(result, note)
        }
        LiveCommand::Delete(target) => {
            let id = match target {
                DeleteTarget::Position(n) => n.checked_sub(1).and_then(|i| tagger.tags().as_slice().get(i)).map(|t| t.event_id),
                DeleteTarget::Id(id) => Some(id),
            };
            match id.and_then(|id| tagger.delete_tag(id)) {
                Some(tag) => println!("  deleted {} (u to undo)", tag.event_label),
                None => println!("  no such tag"),
            }
            Ok(())
        }
        LiveCommand::Adjust(delta) => {
            tagger.adjust_clock(delta);
            Ok(())
        }
        LiveCommand::Log => {
            print_log(tagger);
            Ok(())
        }
        LiveCommand::Status => Ok(()),
        LiveCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        LiveCommand::Quit => Ok(()),
    };
    if let Err(msg) = outcome {
        println!("! {}", msg);
    }
    print_status(tagger, *team);
}

fn report_tag(result: Result<tagging::TagRecord, tagging::EngineError>, note: &mut Option<String>) -> Result<(), String> {
    let tag = result.map_err(|e| e.to_string())?;
    println!(
        "  + [{} {}] {} ({}) clip {:.3}-{:.3}s",
        tag.period_name,
        tag.game_clock_display,
        tag.event_label,
        tag.team_name(),
        tag.clip_start_seconds,
        tag.clip_end_seconds
    );
    *note = None;
    Ok(())
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// The tick only exists while live; it restarts a full second after every resume.
fn sync_ticker(tagger: &LiveTagger, ticker: &mut Option<Interval>) {
    let live = tagger.status() == MatchStatus::Live;
    if live && ticker.is_none() {
        let period = Duration::from_secs(1);
        let mut t = interval_at(Instant::now() + period, period);
        t.set_missed_tick_behavior(MissedTickBehavior::Burst);
        *ticker = Some(t);
    } else if !live {
        *ticker = None;
    }
}

fn print_buttons(tagger: &LiveTagger) {
    let buttons: Vec<String> = tagger
        .session()
        .settings
        .events
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}:{}", i + 1, e.label))
        .collect();
    println!("events  {}", buttons.join("  "));
}

fn print_status(tagger: &LiveTagger, team: TeamSide) {
    let s = &tagger.session().settings;
    println!(
        "[{}] {} {}  team: {}  tags: {}{}",
        tagger.status().label(),
        tagger.period_label(),
        tagger.formatted_clock(),
        team.resolve(&s.team_a, &s.team_b),
        tagger.tags().len(),
        if tagger.can_undo() { "  (undo available)" } else { "" }
    );
}

fn print_log(tagger: &LiveTagger) {
    if tagger.tags().is_empty() {
        println!("  No events tagged yet.");
    }
    for (i, tag) in tagger.tags().iter().enumerate() {
        if tag.is_system() {
            println!("  {:>3}. --- {} * {} ---", i + 1, tag.event_label, tag.game_clock_display);
        } else {
            println!(
                "  {:>3}. {} {}  {}  {}{}",
                i + 1,
                tag.period_name,
                tag.game_clock_display,
                tag.team_name(),
                tag.event_label,
                tag.notes.as_deref().map(|n| format!("  ({})", n)).unwrap_or_default()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_controls() {
        assert_eq!(parse(""), Ok(LiveCommand::Toggle));
        assert_eq!(parse("P"), Ok(LiveCommand::Toggle));
        assert_eq!(parse("end"), Ok(LiveCommand::EndPeriod));
        assert_eq!(parse("u"), Ok(LiveCommand::Undo));
        assert_eq!(parse("q"), Ok(LiveCommand::Quit));
    }

    #[test]
    fn parses_tagging_commands() {
        assert_eq!(parse("3"), Ok(LiveCommand::Shortcut(3)));
        assert_eq!(parse("tag Yellow Card"), Ok(LiveCommand::Tag("Yellow Card".into())));
        assert_eq!(parse("b"), Ok(LiveCommand::Team(TeamSide::TeamB)));
        assert_eq!(parse("note  great save "), Ok(LiveCommand::Note("great save".into())));
    }

    #[test]
    fn parses_clock_adjustments() {
        assert_eq!(parse("+"), Ok(LiveCommand::Adjust(1)));
        assert_eq!(parse("-"), Ok(LiveCommand::Adjust(-1)));
        assert_eq!(parse("+15"), Ok(LiveCommand::Adjust(15)));
        assert_eq!(parse("-3"), Ok(LiveCommand::Adjust(-3)));
        assert!(parse("+x").is_err());
    }

    #[test]
    fn parses_delete_targets() {
        assert_eq!(parse("del 2"), Ok(LiveCommand::Delete(DeleteTarget::Position(2))));
        let id = Uuid::new_v4();
        assert_eq!(parse(&format!("delete {}", id)), Ok(LiveCommand::Delete(DeleteTarget::Id(id))));
        assert!(parse("del").is_err());
        assert!(parse("dance").is_err());
    }
}
