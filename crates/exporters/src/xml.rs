//! `MatchExport` XML document for editor import.

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use tagging::MatchExport;

pub fn render(export: &MatchExport, media_path: Option<&str>) -> Result<String> {
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    open(&mut w, "MatchExport")?;

    let info = &export.info;
    open(&mut w, "MatchInfo")?;
    text(&mut w, "Title", &info.title)?;
    text(&mut w, "Sport", &info.sport)?;
    text(&mut w, "Competition", &info.competition)?;
    text(&mut w, "Date", &info.created_at.format("%Y-%m-%d").to_string())?;
    text(&mut w, "CameraId", &info.camera_id)?;
    text(&mut w, "Fps", &info.fps.to_string())?;
    if let Some(path) = media_path.filter(|p| !p.is_empty()) {
        text(&mut w, "MediaFilePath", path)?;
    }
    close(&mut w, "MatchInfo")?;

    open(&mut w, "Events")?;
    for e in &export.entries {
        open(&mut w, "Event")?;
        text(&mut w, "EventId", &e.event_id.to_string())?;
        text(&mut w, "EventType", &e.label)?;
        text(&mut w, "Team", &e.team)?;
        text(&mut w, "PeriodIndex", &e.period_index.to_string())?;
        text(&mut w, "PeriodName", &e.period_name)?;
        text(&mut w, "GameClockTime", &e.game_clock)?;
        text(&mut w, "AbsoluteTimeSeconds", &format!("{:.3}", e.absolute_seconds))?;
        text(&mut w, "StartTimeSeconds", &format!("{:.3}", e.start_seconds))?;
        text(&mut w, "EndTimeSeconds", &format!("{:.3}", e.end_seconds))?;
        text(&mut w, "StartFrame", &e.start_frame.to_string())?;
        text(&mut w, "EndFrame", &e.end_frame.to_string())?;
        if let Some(notes) = &e.notes {
            text(&mut w, "Notes", notes)?;
        }
        close(&mut w, "Event")?;
    }
    close(&mut w, "Events")?;

    close(&mut w, "MatchExport")?;
    Ok(String::from_utf8(w.into_inner().into_inner())?)
}

fn open<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    w.create_element(name).write_text_content(BytesText::new(value))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_export;

    #[test]
    fn writes_header_and_match_info() {
        let xml = render(&sample_export(), Some("/media/final.mp4")).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<Title>Cup &amp; Final</Title>"));
        assert!(xml.contains("<Date>2024-05-01</Date>"));
        assert!(xml.contains("<Fps>25</Fps>"));
        assert!(xml.contains("<MediaFilePath>/media/final.mp4</MediaFilePath>"));
        assert!(xml.trim_end().ends_with("</MatchExport>"));
    }

    #[test]
    fn events_carry_rounded_frames_and_three_decimals() {
        let xml = render(&sample_export(), None).unwrap();
        assert!(!xml.contains("MediaFilePath"));
        assert!(xml.contains("<AbsoluteTimeSeconds>10.000</AbsoluteTimeSeconds>"));
        assert!(xml.contains("<StartTimeSeconds>5.000</StartTimeSeconds>"));
        assert!(xml.contains("<EndTimeSeconds>15.000</EndTimeSeconds>"));
        assert!(xml.contains("<StartFrame>125</StartFrame>"));
        assert!(xml.contains("<EndFrame>375</EndFrame>"));
        assert!(xml.contains("<Team>Reds</Team>"));
        assert!(xml.contains("<Notes>top corner &lt;left&gt;</Notes>"));
    }

    #[test]
    fn events_are_in_chronological_order() {
        let xml = render(&sample_export(), None).unwrap();
        let foul = xml.find("<EventType>Foul</EventType>").unwrap();
        let goal = xml.find("<EventType>Goal</EventType>").unwrap();
        assert!(foul < goal);
        assert_eq!(xml.matches("<Event>").count(), 2);
    }
}
