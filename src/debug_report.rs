use interject::rules::companion::VoiceEvent;
use interject::{ResolveDetails, ResumeDirective, TierMetrics, Utterance};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub struct Report {
    palette: ansi::Palette,
}

impl Report {
    pub fn new(color: bool) -> Self {
        Report { palette: ansi::Palette::new(color) }
    }

    pub fn print_run(&self, utterance: &Utterance, details: &ResolveDetails) {
        let palette = &self.palette;
        let kind = if utterance.is_final() { "final" } else { "interim" };
        println!("\n{}", palette.bold(palette.paint(format!("⚙  Resolving ({kind}):"), ansi::CYAN)));
        for (idx, hypothesis) in utterance.hypotheses().iter().enumerate() {
            let label = if idx == 0 { "newest" } else { "older" };
            println!("  {} \"{}\"", palette.paint(format!("[{idx}] {label}"), ansi::GRAY), hypothesis);
        }

        println!("\n{}", palette.paint("━━━ Situation ━━━", ansi::GRAY));
        self.print_situation(details);

        println!("\n{}", palette.paint("━━━ Tiers ━━━", ansi::GRAY));
        for tier in &details.tiers {
            self.print_tier(tier);
        }

        println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
        match &details.matched {
            Some(trace) => {
                let trigger = trace.trigger.as_ref().map(ToString::to_string).unwrap_or_else(|| "always".to_string());
                println!(
                    "  {} {} {}",
                    palette.bold(palette.paint(trace.reaction, ansi::GREEN)),
                    palette.dim("│"),
                    palette.paint(trace.classification.name(), ansi::YELLOW),
                );
                println!(
                    "      {} {}  {} {}  {} {}",
                    palette.dim("tier:"),
                    palette.paint(trace.tier.name(), ansi::BLUE),
                    palette.dim("│ trigger:"),
                    palette.paint(trigger, ansi::CYAN),
                    palette.dim("│ pattern:"),
                    palette.paint(&trace.pattern, ansi::CYAN),
                );
            }
            None => {
                println!("{}", palette.dim("  No reaction matched"));
                println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
                println!("  • No trigger key is live (check --last/--previous/--action)");
                println!("  • A precondition failed (see \"unmet\" above)");
                println!("  • Final-only patterns are skipped for interim transcripts");
                println!("\n{}", palette.dim("  Tip: Set RUST_LOG=interject=trace to see every verdict"));
            }
        }

        println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
        let evaluated: usize = details.tiers.iter().map(|t| t.evaluated).sum();
        println!(
            "  Total: {}  │  Reactions evaluated: {}",
            palette.paint(format!("{:?}", details.total), ansi::GREEN),
            palette.paint(evaluated.to_string(), ansi::CYAN),
        );
    }

    pub fn print_response(&self, events: &[VoiceEvent], directive: Option<ResumeDirective>) {
        let palette = &self.palette;
        println!("\n{}", palette.paint("━━━ Response ━━━", ansi::GRAY));
        if events.is_empty() {
            println!("{}", palette.dim("  (nothing said)"));
        }
        for event in events {
            let line = match event {
                VoiceEvent::Said(lines) => {
                    format!("says {}", lines.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
                }
                VoiceEvent::RepeatedLastDialog => "repeats the last line".to_string(),
                VoiceEvent::RepeatedLastQuestion => "repeats the last question".to_string(),
                VoiceEvent::RateChanged { faster: true } => "speaks faster".to_string(),
                VoiceEvent::RateChanged { faster: false } => "speaks slower".to_string(),
                VoiceEvent::Stopped => "stops talking".to_string(),
                VoiceEvent::DimmedLight => "dims the light".to_string(),
            };
            println!("  {} {}", palette.paint("▸", ansi::BLUE), line);
        }

        let directive = match directive {
            Some(ResumeDirective::ContinueExistingTrain) => palette.paint("continue existing train", ansi::GREEN),
            Some(ResumeDirective::RepeatCurrentDialog) => palette.paint("repeat current dialog", ansi::YELLOW),
            Some(other) => palette.paint(format!("{other:?}"), ansi::YELLOW),
            None => palette.dim("not resumed yet"),
        };
        println!("  {} {}", palette.dim("resume:"), directive);
        println!();
    }

    fn print_situation(&self, details: &ResolveDetails) {
        let palette = &self.palette;
        let show = |id: &Option<interject::DialogId>| id.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {}  {} {}  {} {}",
            palette.dim("last:"),
            palette.paint(show(&details.last_spoken), ansi::CYAN),
            palette.dim("│ previous:"),
            palette.paint(show(&details.previous_to_last_spoken), ansi::CYAN),
            palette.dim("│ speaking:"),
            palette.paint(details.speaking.to_string(), ansi::YELLOW),
        );
        let actions = if details.active_actions.is_empty() {
            palette.dim("none")
        } else {
            let tags: Vec<String> = details.active_actions.iter().map(ToString::to_string).collect();
            palette.paint(tags.join(", "), ansi::BLUE)
        };
        println!("  {} {}", palette.dim("actions (newest first):"), actions);
    }

    fn print_tier(&self, tier: &TierMetrics) {
        let palette = &self.palette;
        println!(
            "  {} {}  {} {}  {} {}",
            palette.paint(format!("{:<14}", tier.tier.name()), ansi::BLUE),
            palette.dim(format!("{:?}", tier.duration)),
            palette.dim("keys:"),
            palette.paint(tier.keys.to_string(), ansi::YELLOW),
            palette.dim("evaluated:"),
            palette.paint(tier.evaluated.to_string(), ansi::YELLOW),
        );
        if tier.unmet > 0 || tier.excluded > 0 {
            println!(
                "      {} {}  {} {}",
                palette.dim("unmet:"),
                palette.paint(tier.unmet.to_string(), ansi::GRAY),
                palette.dim("excluded:"),
                palette.paint(tier.excluded.to_string(), ansi::GRAY),
            );
        }
    }
}
