//! Scripted smithing sessions.
//!
//! A session drives one forge and one anvil through a list of steps read from
//! JSON, collecting every finished part with its quality-scaled stats.

use anyhow::{bail, Context, Result};
use emberforge_assets::MaterialRegistry;
use emberforge_core::{
    scoped_rng, ItemStack, PartStats, PartType, QualityGrade, RegistryKey, ToolStats,
};
use emberforge_world::{Forge, StationId, StrikeGrade, Workshop};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    /// Put a fresh part of `material` into the forge.
    Place { material: String, part: String },
    Light,
    Extinguish,
    /// Light the forge if needed and run `ticks` ticks.
    Heat { ticks: u64 },
    /// Move the forge's item onto the anvil.
    Transfer,
    /// Start smithing on the anvil.
    Start,
    Strike { accuracy: f32 },
    /// `count` strikes with seeded random accuracy.
    StrikeRandom { count: u32 },
    /// Run `ticks` ticks without touching anything.
    Wait { ticks: u64 },
}

#[derive(Debug, Deserialize)]
struct SessionScriptFile {
    steps: Vec<SessionStep>,
}

/// Parsed, non-empty list of steps executed in file order.
#[derive(Debug, Clone)]
pub struct SessionScript {
    steps: Vec<SessionStep>,
}

impl SessionScript {
    /// Load a script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session script {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Load a script from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: SessionScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            bail!("session script contains no steps");
        }
        Ok(Self { steps: file.steps })
    }

    pub fn steps(&self) -> &[SessionStep] {
        &self.steps
    }
}

/// Something worth reporting that happened during a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    pub tick: u64,
    pub kind: String,
    pub detail: String,
}

/// A part that came off the anvil.
#[derive(Debug, Clone, Serialize)]
pub struct FinishedPart {
    pub item: ItemStack,
    pub grade: QualityGrade,
    /// Quality-scaled stats, absent if the registry has no entry.
    pub stats: Option<PartStats>,
}

/// Outcome of a session, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub ticks: u64,
    pub parts: Vec<FinishedPart>,
    /// Present once a blade, a handle and a guard have all been finished.
    pub tool: Option<ToolStats>,
    pub events: Vec<SessionEvent>,
}

/// A forge and an anvil bound to a registry for one scripted run.
pub struct Session<'a> {
    registry: &'a MaterialRegistry,
    workshop: Workshop,
    forge: StationId,
    anvil: StationId,
    strike_seed: u64,
    max_ticks: u64,
    parts: Vec<FinishedPart>,
    events: Vec<SessionEvent>,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a MaterialRegistry, strike_seed: u64, max_ticks: u64) -> Self {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        let anvil = workshop.add_anvil();
        Self {
            registry,
            workshop,
            forge,
            anvil,
            strike_seed,
            max_ticks,
            parts: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Station state, for saving.
    pub fn workshop(&self) -> &Workshop {
        &self.workshop
    }

    /// Execute every step, then summarize.
    pub fn run(&mut self, script: &SessionScript) -> Result<SessionReport> {
        for (index, step) in script.steps().iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("Session step {} ({:?}) failed", index + 1, step))?;
        }
        Ok(self.report())
    }

    fn apply(&mut self, step: &SessionStep) -> Result<()> {
        debug!(?step, tick = self.workshop.now().0, "Applying session step");
        match step {
            SessionStep::Place { material, part } => self.place(material, part)?,
            SessionStep::Light => self.forge_mut()?.light(),
            SessionStep::Extinguish => self.forge_mut()?.extinguish(),
            SessionStep::Heat { ticks } => {
                let forge = self.forge_mut()?;
                if forge.item().is_none() {
                    warn!("Heating an empty forge; it will go out");
                }
                forge.light();
                self.advance(*ticks)?;
                let temperature = self.forge_mut()?.temperature();
                self.record("heat", format!("forge at {temperature}"));
            }
            SessionStep::Transfer => {
                match self.workshop.move_forge_item_to_anvil(self.forge, self.anvil) {
                    Ok(()) => {
                        let temperature = self.anvil_temperature();
                        self.record("transfer", format!("workpiece at {temperature}"));
                    }
                    Err(err) => {
                        warn!(%err, "Transfer refused");
                        self.record("transfer_refused", err.to_string());
                    }
                }
            }
            SessionStep::Start => {
                let started = self
                    .workshop
                    .anvil_mut(self.anvil)
                    .context("session anvil missing")?
                    .start_smithing();
                if started {
                    self.record("start", String::new());
                } else {
                    let temperature = self.anvil_temperature();
                    warn!(temperature, "Anvil not ready to smith");
                    self.record("start_refused", format!("anvil at {temperature}"));
                }
            }
            SessionStep::Strike { accuracy } => self.strike(*accuracy)?,
            SessionStep::StrikeRandom { count } => {
                let mut rng = scoped_rng(self.strike_seed, self.workshop.now());
                for _ in 0..*count {
                    let accuracy: f32 = rng.gen_range(0.0..=1.0);
                    self.strike(accuracy)?;
                }
            }
            SessionStep::Wait { ticks } => self.advance(*ticks)?,
        }
        Ok(())
    }

    fn place(&mut self, material: &str, part: &str) -> Result<()> {
        let material = RegistryKey::parse(material)?;
        let part = PartType::new(RegistryKey::parse(part)?);
        if !self.registry.has_stats(&material, &part) {
            bail!("no stats registered for {material} {part}");
        }
        let stack = ItemStack::part(&part, material.clone());
        if self.forge_mut()?.place_item(stack).is_err() {
            bail!("forge already holds an item");
        }
        self.record("place", format!("{material} {part}"));
        Ok(())
    }

    fn strike(&mut self, accuracy: f32) -> Result<()> {
        let anvil = self
            .workshop
            .anvil_mut(self.anvil)
            .context("session anvil missing")?;
        let Some(grade) = anvil.handle_strike(accuracy) else {
            self.record("strike_ignored", format!("{accuracy:.3}"));
            return Ok(());
        };
        let progress = anvil.progress();
        let finished = anvil.take_output();
        self.record(
            "strike",
            format!("{} ({accuracy:.3}) progress {progress}", strike_label(grade)),
        );

        if let Some(item) = finished {
            self.finish(item);
        }
        Ok(())
    }

    fn finish(&mut self, item: ItemStack) {
        let quality = item.quality().unwrap_or(100);
        let grade = QualityGrade::classify(quality);
        let stats = self.registry.scaled_stats_for(&item);
        info!(item = %item.item, quality, ?grade, "Part finished");
        self.record("complete", format!("{} quality {quality}", item.item));
        self.parts.push(FinishedPart { item, grade, stats });
    }

    fn advance(&mut self, ticks: u64) -> Result<()> {
        let target = self.workshop.now().0.saturating_add(ticks);
        if target > self.max_ticks {
            bail!(
                "session would run to tick {target}, past the limit of {}",
                self.max_ticks
            );
        }
        self.workshop.run(ticks);
        Ok(())
    }

    fn forge_mut(&mut self) -> Result<&mut Forge> {
        self.workshop
            .forge_mut(self.forge)
            .context("session forge missing")
    }

    fn anvil_temperature(&self) -> i32 {
        self.workshop
            .anvil(self.anvil)
            .map(|anvil| anvil.temperature())
            .unwrap_or(0)
    }

    fn record(&mut self, kind: &str, detail: String) {
        self.events.push(SessionEvent {
            tick: self.workshop.now().0,
            kind: kind.to_string(),
            detail,
        });
    }

    fn latest_stats(&self, part: &PartType) -> Option<&PartStats> {
        self.parts
            .iter()
            .rev()
            .filter_map(|finished| finished.stats.as_ref())
            .find(|stats| stats.part_type() == part)
    }

    fn report(&self) -> SessionReport {
        let tool = match (
            self.latest_stats(&PartType::blade()),
            self.latest_stats(&PartType::handle()),
            self.latest_stats(&PartType::guard()),
        ) {
            (Some(blade), Some(handle), Some(guard)) => {
                Some(ToolStats::assemble(blade, handle, guard))
            }
            _ => None,
        };
        SessionReport {
            ticks: self.workshop.now().0,
            parts: self.parts.clone(),
            tool,
            events: self.events.clone(),
        }
    }
}

fn strike_label(grade: StrikeGrade) -> &'static str {
    match grade {
        StrikeGrade::Perfect => "perfect",
        StrikeGrade::Good => "good",
        StrikeGrade::Okay => "okay",
        StrikeGrade::Miss => "miss",
    }
}

/// Script used when none is given: one steel blade, smithed well.
pub const DEMO_SCRIPT: &str = r#"{
    "steps": [
        {"action": "place", "material": "steel", "part": "blade"},
        {"action": "heat", "ticks": 1000},
        {"action": "transfer"},
        {"action": "start"},
        {"action": "strike", "accuracy": 0.95},
        {"action": "strike", "accuracy": 0.8},
        {"action": "strike_random", "count": 12}
    ]
}"#;
