//! Synthetic analysis process.
//!
//! Breaks a statement down level by level, the way the analysis backend does:
//! every node above `max_level` gets a `node_update`, and the ones found not
//! to be elementary get two to four dependencies announced as children.

use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use graphview::{Event, NewNode, NodeFields};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SUBJECTS: &[&str] = &[
    "the net force on a body",
    "the total momentum of a closed system",
    "the kinetic energy of a particle",
    "the angle sum of a triangle",
    "the period of a simple pendulum",
    "the pressure of an ideal gas",
    "the charge on a capacitor",
    "the speed of a wave on a string",
    "the work done by a conservative force",
    "the image formed by a thin lens",
];

const CLAIMS: &[&str] = &[
    "is conserved",
    "depends only on the initial and final states",
    "is proportional to the square of the velocity",
    "equals the rate of change of momentum",
    "is independent of the path taken",
    "scales with the applied voltage",
    "follows from Newton's second law",
    "can be written as a sum of components",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub seed: u64,
    pub statement: String,
    /// Nodes at this level are announced but never analyzed
    pub max_level: usize,
    pub max_nodes: usize,
    /// Pause before each announced node
    pub delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            statement: "Energy is conserved in an isolated system".into(),
            max_level: 5,
            max_nodes: 120,
            delay: Duration::from_millis(100),
        }
    }
}

struct Pending {
    id: String,
    level: usize,
    statement: String,
}

/// Produces one full session's messages for `config`. The same seed always yields the same session.
pub fn generate(config: &DemoConfig) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut events = Vec::new();
    let mut processed = HashSet::new();
    let mut queue = VecDeque::new();
    let mut next_id = 0usize;
    let mut announced = 1usize;

    let root = Pending {
        id: node_id(&mut next_id),
        level: 0,
        statement: config.statement.clone(),
    };
    events.push(Event::NodeAdded(NewNode::root(&root.id, &root.statement)));
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        if node.level >= config.max_level || !processed.insert(node.statement.clone()) {
            continue;
        }

        let is_elementary = node.level > 0 && rng.random_bool(elementary_chance(node.level));
        events.push(Event::NodeUpdated {
            id: node.id.clone(),
            fields: NodeFields {
                is_elementary: Some(is_elementary),
                explanation: Some(explanation(&node.statement, is_elementary)),
                proof_text: Some(format!("Sketch: reduce \"{}\" to simpler facts.", node.statement)),
            },
        });
        if is_elementary {
            continue;
        }

        let wanted = rng.random_range(2..=4);
        for _ in 0..wanted {
            if announced >= config.max_nodes {
                break;
            }
            let statement = random_statement(&mut rng);
            if processed.contains(&statement) {
                continue;
            }
            let child = Pending {
                id: node_id(&mut next_id),
                level: node.level + 1,
                statement,
            };
            events.push(Event::NodeAdded(NewNode::child(
                &child.id,
                &child.statement,
                child.level,
                &node.id,
            )));
            announced += 1;
            queue.push_back(child);
        }
    }

    tracing::debug!(nodes = announced, seed = config.seed, "demo session generated");
    events.push(Event::SessionCompleted);
    events
}

/// Writes the session for `config` as newline-delimited wire messages
pub fn write_jsonl(config: &DemoConfig, path: &Path) -> Result<usize> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let events = generate(config);
    for event in &events {
        serde_json::to_writer(&mut out, &event.to_value())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(events.len())
}

fn node_id(next: &mut usize) -> String {
    let id = format!("n{next}");
    *next += 1;
    id
}

fn elementary_chance(level: usize) -> f64 {
    (0.15 + 0.2 * level as f64).min(1.0)
}

fn random_statement(rng: &mut StdRng) -> String {
    let subject = SUBJECTS[rng.random_range(0..SUBJECTS.len())];
    let claim = CLAIMS[rng.random_range(0..CLAIMS.len())];
    let mut statement = format!("{subject} {claim}");
    if let Some(first) = statement.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    statement
}

fn explanation(statement: &str, is_elementary: bool) -> String {
    if is_elementary {
        format!("\"{statement}\" can be checked directly from basic definitions.")
    } else {
        format!("\"{statement}\" needs further supporting facts.")
    }
}
