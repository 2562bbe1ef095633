//! Line-oriented walk through one session.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use vantage_engine::{
    Calibration, Classification, ExpansionOutcome, NodeId, NodeType, PathId, Phase, Receipt,
    SessionId, VantageService,
};

const EXPEDITION_HELP: &str = "\
Map the territory. One entry per line:
  expand [focus]                    ask the backend (or get a prompt to work through)
  ground|convention|unknown <label> add a node
  edge <source> <target> [label]    link two nodes by id
  flag <id>                         mark a node as a discovery
  assume ground|convention <text>   classify an assumption
  done                              consolidate";

/// One line typed during the expedition phase.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Entry {
    Expand(Option<String>),
    Node(NodeType, String),
    Edge(NodeId, NodeId, Option<String>),
    Flag(NodeId),
    Assume(Classification, String),
    Done,
}

impl Entry {
    /// `None` for anything that is not a well-formed entry.
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("done") {
            return Some(Entry::Done);
        }
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match head.to_ascii_lowercase().as_str() {
            "expand" => Some(Entry::Expand((!rest.is_empty()).then(|| rest.to_string()))),
            "flag" => rest.parse().ok().map(Entry::Flag),
            "edge" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                let source = parts.next()?.parse().ok()?;
                let target = parts.next()?.parse().ok()?;
                let label = parts
                    .next()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                Some(Entry::Edge(source, target, label))
            }
            "assume" => {
                let (kind, statement) = rest.split_once(char::is_whitespace)?;
                let statement = statement.trim();
                if statement.is_empty() {
                    return None;
                }
                Some(Entry::Assume(
                    Classification::parse(kind)?,
                    statement.to_string(),
                ))
            }
            other => {
                let node_type = NodeType::parse(other)?;
                (!rest.is_empty()).then(|| Entry::Node(node_type, rest.to_string()))
            }
        }
    }
}

pub(crate) struct Walk<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Walk<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Start a session for `friction` and drive it to a receipt.
    pub(crate) async fn run(&mut self, service: &VantageService, friction: &str) -> Result<Receipt> {
        let session = service.start(friction)?;
        let id = session.id().clone();
        writeln!(self.output, "Mode: {}", service.mode().description())?;
        tracing::info!(session_id = %id, mode = %service.mode(), "Walk started");

        self.provocation(service, &id).await?;
        loop {
            self.expedition(service, &id).await?;
            if self.vantage(service, &id).await? {
                break;
            }
        }
        self.paths(service, &id).await?;

        Ok(service.generate_receipt(&id).await?)
    }

    async fn provocation(&mut self, service: &VantageService, id: &SessionId) -> Result<()> {
        writeln!(self.output, "\n== {} ==", Phase::Provocation.as_str())?;
        let calibration = Calibration {
            what_wrong: self.ask("What specifically is wrong?")?,
            how_long: self.ask("How long has this been the case?")?,
            what_right: self.ask("What would 'right' look like?")?,
        };
        let statement = service.calibrate(id, calibration).await?;
        writeln!(self.output, "{statement}")?;
        service.complete_provocation(id).await?;
        Ok(())
    }

    async fn expedition(&mut self, service: &VantageService, id: &SessionId) -> Result<()> {
        writeln!(self.output, "\n== {} ==\n{EXPEDITION_HELP}", Phase::Expedition.as_str())?;
        loop {
            let Some(line) = self.read_line()? else {
                break;
            };
            let Some(entry) = Entry::parse(&line) else {
                writeln!(self.output, "Unrecognized entry: {}", line.trim())?;
                continue;
            };
            if entry == Entry::Done {
                break;
            }
            // Entry failures are reported and the walk continues.
            if let Err(e) = self.apply(service, id, entry).await {
                writeln!(self.output, "error: {e}")?;
            }
        }
        service.advance_phase(id, Phase::Vantage).await?;
        Ok(())
    }

    async fn apply(&mut self, service: &VantageService, id: &SessionId, entry: Entry) -> Result<()> {
        match entry {
            Entry::Expand(focus) => match service.expand(id, focus.as_deref()).await? {
                ExpansionOutcome::Manual {
                    prompt,
                    instruction,
                } => writeln!(self.output, "{prompt}\n\n{instruction}")?,
                ExpansionOutcome::Expanded {
                    nodes_added,
                    threshold,
                    ..
                } => {
                    for node in &nodes_added {
                        writeln!(
                            self.output,
                            "  [{}] {} ({}, {:.2})",
                            node.id,
                            node.label,
                            node.node_type.as_str(),
                            node.significance
                        )?;
                    }
                    writeln!(self.output, "Threshold: {threshold:.3}")?;
                }
            },
            Entry::Node(node_type, label) => {
                let node = service.add_node(id, label, node_type, None).await?;
                writeln!(self.output, "  [{}] {}", node.id, node.label)?;
            }
            Entry::Edge(source, target, label) => {
                let edge = service.add_edge(id, source, target, label.as_deref()).await?;
                writeln!(
                    self.output,
                    "  {} -{}-> {}",
                    edge.source_id, edge.label, edge.target_id
                )?;
            }
            Entry::Flag(node_id) => {
                let node = service.flag_significant(id, node_id).await?;
                writeln!(self.output, "  discovery: {}", node.label)?;
            }
            Entry::Assume(classification, statement) => {
                let assumption = service
                    .classify_assumption(id, statement, classification, "")
                    .await?;
                writeln!(
                    self.output,
                    "  {}: {}",
                    assumption.classification.as_str(),
                    assumption.statement
                )?;
            }
            Entry::Done => {}
        }
        Ok(())
    }

    /// `true` once a goal is set; `false` when the user goes back to explore.
    async fn vantage(&mut self, service: &VantageService, id: &SessionId) -> Result<bool> {
        writeln!(self.output, "\n== {} ==", Phase::Vantage.as_str())?;
        let summary = service.consolidate(id).await?;
        writeln!(
            self.output,
            "Covered {} (ground {}, convention {}, unknown {}). {}",
            summary.territory_covered,
            summary.ground,
            summary.convention,
            summary.unknown,
            summary.recommendation
        )?;

        for (index, discovery) in summary.discoveries.iter().enumerate() {
            let answer = self.ask(&format!("Verify discovery '{}'? [y/N]", discovery.finding))?;
            if answer.eq_ignore_ascii_case("y") {
                service.verify_discovery(id, index).await?;
            }
        }

        let goal = self.ask("Goal (or 'back' to keep exploring):")?;
        if goal.eq_ignore_ascii_case("back") {
            service.return_to_expedition(id).await?;
            return Ok(false);
        }
        if goal.is_empty() {
            bail!("a goal is required before paths can be generated");
        }
        service.set_goal(id, goal).await?;
        service.complete_vantage(id).await?;
        Ok(true)
    }

    async fn paths(&mut self, service: &VantageService, id: &SessionId) -> Result<()> {
        writeln!(self.output, "\n== {} ==", Phase::Paths.as_str())?;
        let paths = service.generate_paths(id).await?;
        for path in paths.iter() {
            writeln!(
                self.output,
                "{}. {} [risk {}, confidence {:.2}]\n   {}",
                path.path_id,
                path.label,
                path.risk.as_str(),
                path.confidence,
                path.description
            )?;
        }

        loop {
            let choice = self.ask("Commit to path A, B or C:")?;
            if let Some(path_id) = PathId::parse(&choice) {
                service.commit_path(id, path_id).await?;
                return Ok(());
            }
            if choice.is_empty() {
                bail!("input closed before a path was chosen");
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        writeln!(self.output, "{question}")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default().trim().to_string())
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
