//! Playground scenarios: scripted get/put runs with recorded transcripts

use lrulab::{IntCache, NOT_FOUND};

/// One scripted call against the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Put(i64, i64),
    /// Lookup and the value the scenario expects back
    Get(i64, i64),
}

pub struct Scenario {
    pub name: &'static str,
    pub capacity: i64,
    pub ops: &'static [Op],
}

pub struct Report {
    pub name: &'static str,
    pub lines: Vec<String>,
    pub passed: bool,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "basic eviction",
        capacity: 2,
        ops: &[
            Op::Put(1, 1),
            Op::Put(2, 2),
            Op::Get(1, 1),
            Op::Put(3, 3),
            Op::Get(2, NOT_FOUND),
            Op::Put(4, 4),
            Op::Get(1, NOT_FOUND),
            Op::Get(3, 3),
            Op::Get(4, 4),
        ],
    },
    Scenario {
        name: "update existing key",
        capacity: 2,
        ops: &[
            Op::Put(1, 1),
            Op::Put(2, 2),
            Op::Get(1, 1),
            Op::Put(1, 3),
            Op::Get(1, 3),
            Op::Get(2, 2),
        ],
    },
    Scenario {
        name: "single slot",
        capacity: 1,
        ops: &[Op::Put(1, 1), Op::Put(2, 2), Op::Get(1, NOT_FOUND), Op::Get(2, 2)],
    },
];

impl Scenario {
    /// Replay the script on a fresh cache
    pub fn run(&self) -> lrulab::Result<Report> {
        let mut cache = IntCache::new(self.capacity)?;
        let mut lines = Vec::with_capacity(self.ops.len() + 2);
        let mut passed = true;

        let script: Vec<String> = self
            .ops
            .iter()
            .map(|op| match *op {
                Op::Put(k, v) => format!("put({}, {})", k, v),
                Op::Get(k, _) => format!("get({})", k),
            })
            .collect();
        lines.push(format!("capacity {}: {}", self.capacity, script.join(", ")));

        for op in self.ops {
            match *op {
                Op::Put(k, v) => cache.put(k, v),
                Op::Get(k, expected) => {
                    let got = cache.get(k);
                    if got == expected {
                        lines.push(format!("cache.get({}) = {}", k, got));
                    } else {
                        passed = false;
                        lines.push(format!("cache.get({}) = {} (expected {})", k, got, expected));
                    }
                }
            }
        }
        lines.push(format!("final state (MRU first): {}", cache));

        Ok(Report {
            name: self.name,
            lines,
            passed,
        })
    }
}

/// Run every built-in scenario
pub fn run_all() -> lrulab::Result<Vec<Report>> {
    SCENARIOS.iter().map(Scenario::run).collect()
}
