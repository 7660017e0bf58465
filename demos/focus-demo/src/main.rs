//! StudyLens Focus Demo
//!
//! Plays a scripted study session through the monitor service:
//! - Steady focus, then looking away
//! - Raising a hand to ask a question (doubt mode + transcript)
//! - Back to work, then a summary with chat and recommendations
//!
//! Usage: focus-demo [config.json]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use studylens_core::StudyResult;
use studylens_runtime::{
    init_tracing, spawn_monitor, Assistant, CannedVideoSearch, ChatRole, Monitor,
    MonitorCapabilities, MonitorConfig, MonitorHandle, ASSISTANT_SYSTEM_PROMPT,
};
use studylens_test::{FrameSimulator, SceneConfig, Segment};
use studylens_time::MonotonicClock;
use studylens_visual::{CameraRequest, CameraSource};
use studylens_voice::{
    AlertSound, RecognitionSettings, Utterance, VoiceHandle, VoiceInput, VoiceOutput,
};

/// Pretends to open a webcam; frames come from the simulator
struct SimulatedCamera;

impl CameraSource for SimulatedCamera {
    fn start(&mut self, request: &CameraRequest) -> StudyResult<()> {
        println!("📷 camera on ({}x{})", request.width, request.height);
        Ok(())
    }

    fn stop(&mut self) {
        println!("📷 camera off");
    }
}

struct ConsoleMicrophone {
    next: u64,
}

impl VoiceInput for ConsoleMicrophone {
    fn start(&mut self, settings: &RecognitionSettings) -> StudyResult<VoiceHandle> {
        self.next += 1;
        println!("🎤 listening ({})", settings.language);
        Ok(VoiceHandle::new(self.next))
    }

    fn stop(&mut self, _handle: VoiceHandle) {
        println!("🎤 stopped listening");
    }
}

struct ConsoleSpeaker;

impl VoiceOutput for ConsoleSpeaker {
    fn speak(&mut self, utterance: &Utterance) -> StudyResult<()> {
        println!("🔊 ({:.1}x) {}", utterance.rate, utterance.text);
        Ok(())
    }
}

struct TerminalBell;

impl AlertSound for TerminalBell {
    fn play(&mut self) -> StudyResult<()> {
        print!("\x07");
        Ok(())
    }
}

/// Offline tutor that streams a fixed explanation after a short think
struct OfflineTutor {
    system_prompt: &'static str,
    latency: Duration,
}

#[async_trait]
impl Assistant for OfflineTutor {
    async fn submit(&self, user_text: &str) -> StudyResult<Vec<String>> {
        debug!(system = self.system_prompt, question = user_text, "tutor request");
        tokio::time::sleep(self.latency).await;
        Ok(vec![
            "Great question! ".to_string(),
            format!("\"{}\" ", user_text),
            "is easier once you break it into steps. ".to_string(),
            "Try summarizing each step in your own words.".to_string(),
        ])
    }
}

/// One stretch of the scripted session
struct Phase {
    label: &'static str,
    segment: Segment,
    question: Option<&'static str>,
}

fn script() -> Vec<Phase> {
    vec![
        Phase {
            label: "reading the textbook",
            segment: Segment::focused(Duration::from_secs(6)),
            question: None,
        },
        Phase {
            label: "checking the phone",
            segment: Segment::away(Duration::from_secs(5)),
            question: None,
        },
        Phase {
            label: "raising a hand",
            segment: Segment::hand_raised(Duration::from_secs(2)),
            question: Some("how does photosynthesis work"),
        },
        Phase {
            label: "hand down",
            segment: Segment::hand_lowered(Duration::from_secs(1)),
            question: None,
        },
        Phase {
            label: "back to work",
            segment: Segment::focused(Duration::from_secs(4)),
            question: None,
        },
    ]
}

fn load_config() -> StudyResult<MonitorConfig> {
    match std::env::args().nth(1) {
        Some(path) => MonitorConfig::from_file(path),
        None => Ok(MonitorConfig::default()),
    }
}

fn print_status(handle: &MonitorHandle) {
    let s = handle.snapshot();
    let note = if s.doubt_mode_active {
        "  ✋ doubt mode"
    } else if s.pending_inquiries > 0 {
        "  💭 thinking"
    } else {
        ""
    };
    println!(
        "[{:>6}] {:<40} focus {}  distracted {}  xp {} (lvl {}){}",
        handle.now().as_millis(),
        s.message,
        s.focus_time,
        s.distracted_time,
        s.xp,
        s.level,
        note,
    );
}

async fn play(
    handle: &MonitorHandle,
    sim: &mut FrameSimulator,
    phase: &Phase,
) -> StudyResult<()> {
    println!("--- {} ---", phase.label);
    let mut next_status = handle.now().as_millis() + 1_000;

    for frame in sim.render(std::slice::from_ref(&phase.segment)) {
        let wait = frame.timestamp.millis_since(handle.now());
        if wait > 0 {
            tokio::time::sleep(Duration::from_millis(wait as u64)).await;
        }
        handle.send_frame(frame).await?;

        if handle.now().as_millis() >= next_status {
            print_status(handle);
            next_status += 1_000;
        }
    }

    if let Some(question) = phase.question {
        println!("🗣  \"{}\"", question);
        handle.transcript(question).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_tracing(&config.log);

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║           StudyLens - Focus Monitor Demo                   ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let monitor = Monitor::with_config(
        MonitorCapabilities {
            camera: Box::new(SimulatedCamera),
            voice: Box::new(ConsoleMicrophone { next: 0 }),
            alert: Box::new(TerminalBell),
            assistant: Box::new(OfflineTutor {
                system_prompt: ASSISTANT_SYSTEM_PROMPT,
                latency: Duration::from_millis(1_500),
            }),
            videos: Box::new(CannedVideoSearch),
        },
        config,
    )
    .with_speech(Box::new(ConsoleSpeaker));

    let handle = spawn_monitor(monitor, Arc::new(MonotonicClock::new()));
    handle.start().await?;
    info!("session started");

    let mut sim = FrameSimulator::new(SceneConfig::noisy(), 2024).starting_at(handle.now());
    for phase in script() {
        play(&handle, &mut sim, &phase).await?;
    }

    handle.stop().await;
    let mut monitor = handle.shutdown().await?;

    println!();
    println!("=== Session summary ===");
    let snapshot = monitor.snapshot();
    println!("Focus time:      {}", snapshot.focus_time);
    println!("Distracted time: {}", snapshot.distracted_time);
    println!(
        "XP: {} (level {}, {} to next level)",
        monitor.xp().xp(),
        monitor.xp().level(),
        monitor.xp().xp_to_next_level()
    );

    println!();
    for turn in monitor.chat().turns() {
        println!("{:?}: {}", turn.role, turn.text);
    }

    println!();
    println!("Recommended videos:");
    for video in monitor.recommendations() {
        println!(
            "  {} - {} [{}] {}",
            video.title,
            video.channel,
            video.duration.as_deref().unwrap_or("?"),
            video.watch_url()
        );
    }

    let reply = monitor
        .chat()
        .turns()
        .iter()
        .rposition(|t| t.role == ChatRole::Assistant && !t.failed);
    if let Some(turn) = reply {
        monitor.read_aloud(turn)?;
    }

    Ok(())
}
