use std::f32::consts::TAU;

use rand::Rng;
use rand::seq::SliceRandom;

pub const PORT_CATALOG: [&str; 14] = [
    "80", "443", "22", "3306", "8080", "5432", "5000", "25", "21", "110", "143", "993", "995",
    "1024",
];

const MAX_SAMPLED_PORTS: usize = 5;
const SERVER_PROBABILITY: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    Server,
    Host,
}

impl HostKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Host => "Host",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortUsage {
    pub port: &'static str,
    pub used: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortSample {
    pub kind: HostKind,
    pub ports: Vec<PortUsage>,
}

impl PortSample {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let count = rng.gen_range(0..=MAX_SAMPLED_PORTS);
        let ports = PORT_CATALOG
            .choose_multiple(rng, count)
            .map(|&port| PortUsage {
                port,
                used: rng.gen_range(0.0..100.0),
            })
            .collect();
        let kind = if rng.gen_bool(SERVER_PROBABILITY) {
            HostKind::Server
        } else {
            HostKind::Host
        };

        Self { kind, ports }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieSlice {
    pub index: usize,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f32 {
        (self.start_angle + self.end_angle) * 0.5
    }

    pub fn sweep(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

/// Angles are clockwise from twelve o'clock and cover the full turn.
pub fn pie_slices(ports: &[PortUsage]) -> Vec<PieSlice> {
    let total = ports
        .iter()
        .map(|usage| usage.used.max(0.0))
        .sum::<f32>();
    if total <= f32::EPSILON {
        return Vec::new();
    }

    let mut angle = 0.0;
    ports
        .iter()
        .enumerate()
        .map(|(index, usage)| {
            let sweep = usage.used.max(0.0) / total * TAU;
            let slice = PieSlice {
                index,
                start_angle: angle,
                end_angle: angle + sweep,
            };
            angle += sweep;
            slice
        })
        .collect()
}
