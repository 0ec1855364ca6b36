//! Gesture sources — an external landmark feed, or keyboard simulation.
//!
//! The public interface is [`GestureEvent`] delivered over a `mpsc` channel.
//! The app drains the channel once per frame, so events never overlap and a
//! dropped frame just means no update until the next one.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use tracing::{debug, info};

use tree_gesture::{classify, Gesture, GestureSample, HandLandmarks, Landmark};

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// An event for the app loop.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// One classified detection frame.
    Sample(GestureSample),

    /// Add a placeholder photo card.
    AddPhoto,

    /// Delete the focused photo.
    RemoveFocused,

    /// The landmark feed is gone (never opened, or ended).  No further
    /// samples will arrive from it.
    DetectorLost(String),

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for feed and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureEvent`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>);
}

/// Run a gesture source on its own thread, sending into `tx`.
pub fn spawn_gesture_source<G: GestureSource>(source: G, tx: Sender<GestureEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(tx))
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark frames (JSON lines)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct HandJson {
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Classify one feed line: `{"hands":[{"landmarks":[{"x":..,"y":..,"z":..}, ...]}]}`.
///
/// Blank lines yield `None`.  A frame with no hands, or one the detector
/// flagged with `error`, is a no-hand sample.  Only the first hand counts.
pub fn parse_frame(line: &str) -> Result<Option<GestureSample>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let frame: FrameJson = serde_json::from_str(line).context("malformed landmark frame")?;
    if let Some(err) = frame.error {
        debug!("detector reported: {}", err);
        return Ok(Some(GestureSample::no_hand()));
    }
    match frame.hands.first() {
        None => Ok(Some(GestureSample::no_hand())),
        Some(hand) => {
            let hand = HandLandmarks::from_slice(&hand.landmarks)?;
            Ok(Some(classify(&hand)))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFeedSource — external detector output
// ════════════════════════════════════════════════════════════════════════════

enum FeedInput {
    Stdin,
    File(PathBuf),
    /// Detector command line; its stdout is the feed.
    Command(String),
    Reader(Box<dyn BufRead + Send>),
}

/// Reads JSON-lines landmark frames from a detector and classifies each.
pub struct LandmarkFeedSource {
    input: FeedInput,
}

impl LandmarkFeedSource {
    /// `-` reads stdin; anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        let input = if arg == "-" { FeedInput::Stdin } else { FeedInput::File(PathBuf::from(arg)) };
        LandmarkFeedSource { input }
    }

    pub fn from_command(cmdline: &str) -> Self {
        LandmarkFeedSource { input: FeedInput::Command(cmdline.to_string()) }
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        LandmarkFeedSource { input: FeedInput::Reader(Box::new(reader)) }
    }

    fn open(self) -> Result<(Box<dyn BufRead + Send>, Option<Child>)> {
        match self.input {
            FeedInput::Stdin => Ok((Box::new(BufReader::new(io::stdin())), None)),
            FeedInput::File(path) => {
                let f = File::open(&path)
                    .with_context(|| format!("opening landmark feed {}", path.display()))?;
                Ok((Box::new(BufReader::new(f)), None))
            }
            FeedInput::Command(cmdline) => {
                let mut parts = cmdline.split_whitespace();
                let program = parts.next().context("empty detector command")?;
                let mut child = Command::new(program)
                    .args(parts)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .spawn()
                    .with_context(|| format!("starting detector `{}`", cmdline))?;
                let stdout = child.stdout.take().context("detector has no stdout")?;
                Ok((Box::new(BufReader::new(stdout)), Some(child)))
            }
            FeedInput::Reader(r) => Ok((r, None)),
        }
    }
}

impl GestureSource for LandmarkFeedSource {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>) {
        let (reader, mut child) = match (*self).open() {
            Ok(opened) => opened,
            Err(e) => {
                let _ = tx.send(GestureEvent::DetectorLost(format!("{:#}", e)));
                return;
            }
        };
        info!("landmark feed open");

        let mut reason = "landmark feed ended".to_string();
        for line in reader.lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => { reason = format!("landmark feed read error: {}", e); break; }
            };
            match parse_frame(&line) {
                Ok(Some(sample)) => {
                    if tx.send(GestureEvent::Sample(sample)).is_err() { return; }
                }
                Ok(None) => {}
                Err(e) => debug!("skipping frame: {:#}", e),
            }
        }

        if let Some(child) = child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = tx.send(GestureEvent::DetectorLost(reason));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Simulated key codes (mapped from minifb Key by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Fist,          // F
    Open,          // O
    Pinch,         // P
    HandLeft,      // ←
    HandRight,     // →
    HandUp,        // ↑
    HandDown,      // ↓
    AddPhoto,      // N
    RemoveFocused, // Delete / Backspace
    Quit,          // Q
}

/// Hand-position step per arrow press.
const HAND_STEP: f32 = 0.25;

/// Gesture source driven by [`SimKey`]s from the visualizer's window.
///
/// Keeps a simulated hand position so arrow keys can steer the scatter
/// camera the way a real hand would.
pub struct SimGestureSource {
    pub rx: Receiver<SimKey>,
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>) {
        let mut hand = Vec2::ZERO;
        for key in self.rx {
            let event = match key {
                SimKey::Fist  => GestureEvent::Sample(GestureSample::new(Gesture::Fist, hand)),
                SimKey::Open  => GestureEvent::Sample(GestureSample::new(Gesture::Open, hand)),
                SimKey::Pinch => GestureEvent::Sample(GestureSample::new(Gesture::Pinch, hand)),
                SimKey::HandLeft | SimKey::HandRight | SimKey::HandUp | SimKey::HandDown => {
                    let step = match key {
                        SimKey::HandLeft  => Vec2::new(-HAND_STEP, 0.0),
                        SimKey::HandRight => Vec2::new(HAND_STEP, 0.0),
                        SimKey::HandUp    => Vec2::new(0.0, HAND_STEP),
                        _                 => Vec2::new(0.0, -HAND_STEP),
                    };
                    hand = (hand + step).clamp(Vec2::new(-2.0, -1.0), Vec2::new(2.0, 1.0));
                    GestureEvent::Sample(GestureSample::new(Gesture::None, hand))
                }
                SimKey::AddPhoto      => GestureEvent::AddPhoto,
                SimKey::RemoveFocused => GestureEvent::RemoveFocused,
                SimKey::Quit => {
                    let _ = tx.send(GestureEvent::Quit);
                    return;
                }
            };
            if tx.send(event).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    /// 21 landmarks as JSON with the four fingers either all up or all curled.
    fn hand_json(open: bool) -> String {
        let mut pts = vec![(0.5f32, 0.6f32); 21];
        pts[0] = (0.5, 0.8);
        pts[4] = (0.3, 0.55);
        for (pip, tip) in [(6, 8), (10, 12), (14, 16), (18, 20)] {
            pts[pip] = (0.5, 0.5);
            pts[tip] = (0.5, if open { 0.35 } else { 0.58 });
        }
        let body: Vec<String> = pts
            .iter()
            .map(|(x, y)| format!(r#"{{"x":{},"y":{},"z":0.0}}"#, x, y))
            .collect();
        format!(r#"{{"hands":[{{"landmarks":[{}]}}]}}"#, body.join(","))
    }

    fn collect(source: impl GestureSource) -> Vec<GestureEvent> {
        let (tx, rx) = mpsc::channel();
        spawn_gesture_source(source, tx).join().unwrap();
        rx.into_iter().collect()
    }

    #[test]
    fn parse_open_and_fist() {
        assert_eq!(parse_frame(&hand_json(true)).unwrap().unwrap().gesture, Gesture::Open);
        assert_eq!(parse_frame(&hand_json(false)).unwrap().unwrap().gesture, Gesture::Fist);
    }

    #[test]
    fn parse_empty_hands_is_no_hand() {
        assert_eq!(parse_frame(r#"{"hands":[]}"#).unwrap(), Some(GestureSample::no_hand()));
        assert_eq!(parse_frame("{}").unwrap(), Some(GestureSample::no_hand()));
    }

    #[test]
    fn parse_detector_error_is_no_hand() {
        assert_eq!(
            parse_frame(r#"{"hands":[],"error":"camera busy"}"#).unwrap(),
            Some(GestureSample::no_hand())
        );
    }

    #[test]
    fn parse_blank_line_is_skipped() {
        assert_eq!(parse_frame("   ").unwrap(), None);
    }

    #[test]
    fn parse_rejects_garbage_and_short_hands() {
        assert!(parse_frame("not json").is_err());
        assert!(parse_frame(r#"{"hands":[{"landmarks":[{"x":0.1,"y":0.2}]}]}"#).is_err());
    }

    #[test]
    fn feed_classifies_lines_then_reports_end_once() {
        let text = format!("{}\n\ngarbage\n{}\n{{\"hands\":[]}}\n", hand_json(true), hand_json(false));
        let events = collect(LandmarkFeedSource::from_reader(Cursor::new(text)));
        let gestures: Vec<Gesture> = events.iter().filter_map(|e| match e {
            GestureEvent::Sample(s) => Some(s.gesture),
            _ => None,
        }).collect();
        assert_eq!(gestures, vec![Gesture::Open, Gesture::Fist, Gesture::None]);
        let lost = events.iter().filter(|e| matches!(e, GestureEvent::DetectorLost(_))).count();
        assert_eq!(lost, 1);
        assert!(matches!(events.last(), Some(GestureEvent::DetectorLost(_))));
    }

    #[test]
    fn missing_feed_file_reports_detector_lost() {
        let events = collect(LandmarkFeedSource::from_arg("/no/such/landmarks.jsonl"));
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], GestureEvent::DetectorLost(msg) if msg.contains("landmarks.jsonl")));
    }

    #[test]
    fn missing_detector_command_reports_detector_lost() {
        let events = collect(LandmarkFeedSource::from_command("definitely-not-a-detector-binary --fast"));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GestureEvent::DetectorLost(_)));
    }

    #[test]
    fn sim_keys_map_to_events() {
        let (key_tx, key_rx) = mpsc::channel();
        for k in [SimKey::Open, SimKey::HandRight, SimKey::HandUp, SimKey::Pinch, SimKey::AddPhoto, SimKey::Quit, SimKey::Fist] {
            key_tx.send(k).unwrap();
        }
        drop(key_tx);
        let events = collect(SimGestureSource { rx: key_rx });
        let hand = Vec2::new(HAND_STEP, HAND_STEP);
        assert_eq!(events, vec![
            GestureEvent::Sample(GestureSample::new(Gesture::Open, Vec2::ZERO)),
            GestureEvent::Sample(GestureSample::new(Gesture::None, Vec2::new(HAND_STEP, 0.0))),
            GestureEvent::Sample(GestureSample::new(Gesture::None, hand)),
            GestureEvent::Sample(GestureSample::new(Gesture::Pinch, hand)),
            GestureEvent::AddPhoto,
            GestureEvent::Quit,
        ]);
    }

    #[test]
    fn sim_hand_is_clamped() {
        let (key_tx, key_rx) = mpsc::channel();
        for _ in 0..20 { key_tx.send(SimKey::HandLeft).unwrap(); }
        drop(key_tx);
        let events = collect(SimGestureSource { rx: key_rx });
        match events.last() {
            Some(GestureEvent::Sample(s)) => assert_eq!(s.hand, Vec2::new(-2.0, 0.0)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
