use eframe::egui::{Pos2, Vec2, vec2};

use super::quadtree::QuadNode;

/// Spring between two linked nodes, precomputed once per run.
#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

impl Link {
    pub(super) fn build(links: &[(usize, usize)], node_count: usize, scale: f32) -> Vec<Self> {
        let mut counts = vec![0usize; node_count];
        for &(source, target) in links {
            if source < node_count && target < node_count && source != target {
                counts[source] += 1;
                counts[target] += 1;
            }
        }

        links
            .iter()
            .filter(|(source, target)| {
                *source < node_count && *target < node_count && source != target
            })
            .map(|&(source, target)| {
                let source_count = counts[source] as f32;
                let target_count = counts[target] as f32;
                Self {
                    source,
                    target,
                    strength: scale / source_count.min(target_count),
                    bias: source_count / (source_count + target_count),
                }
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta_sq: f32,
    pub(super) distance_min_sq: f32,
}

fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

pub(super) fn apply_links(
    links: &[Link],
    distance: f32,
    alpha: f32,
    positions: &[Pos2],
    velocities: &mut [Vec2],
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        let mut delta = (positions[target] + velocities[target])
            - (positions[source] + velocities[source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle(source, target);
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * link.strength);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

fn charge_between(delta: Vec2, distance_sq: f32, weight: f32, params: ChargeParams) -> Vec2 {
    let distance_sq = if distance_sq < params.distance_min_sq {
        (params.distance_min_sq * distance_sq).sqrt()
    } else {
        distance_sq
    };
    delta * (weight / distance_sq)
}

/// Adds the many-body contribution of `node` to the velocity of `index`.
///
/// Cells far enough away relative to their size act as a single body at
/// their center of mass.
pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Pos2],
    alpha: f32,
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = positions[other_index] - point;
            if delta.length_sq() <= f32::EPSILON {
                delta = jiggle(index, other_index);
            }
            *velocity += charge_between(delta, delta.length_sq(), params.strength * alpha, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = node.bounds.side_length();
    let can_approximate =
        !node.bounds.contains(point) && (side * side / params.theta_sq) < distance_sq;

    if can_approximate {
        let weight = params.strength * node.mass * alpha;
        *velocity += charge_between(delta, distance_sq, weight, params);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, alpha, params, velocity);
    }
}

pub(super) fn apply_charge(
    positions: &[Pos2],
    alpha: f32,
    params: ChargeParams,
    velocities: &mut [Vec2],
) {
    let Some(tree) = QuadNode::build(positions) else {
        return;
    };

    for (index, velocity) in velocities.iter_mut().enumerate() {
        accumulate_charge_for_node(&tree, index, positions, alpha, params, velocity);
    }
}

/// Translates every position so the centroid lands on `center`.
pub(super) fn apply_center(positions: &mut [Pos2], center: Pos2) {
    if positions.is_empty() {
        return;
    }

    let mut sum = Vec2::ZERO;
    for position in positions.iter() {
        sum += position.to_vec2();
    }
    let shift = center - (sum / positions.len() as f32).to_pos2();
    for position in positions.iter_mut() {
        *position += shift;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn charge() -> ChargeParams {
        ChargeParams {
            strength: -50.0,
            theta_sq: 0.81,
            distance_min_sq: 1.0,
        }
    }

    #[test]
    fn link_strength_follows_the_lesser_degree() {
        let links = Link::build(&[(0, 1), (0, 2), (0, 3)], 4, 1.0);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].strength, 1.0);
        assert!((links[0].bias - 0.75).abs() < 1e-6);
    }

    #[test]
    fn invalid_links_are_dropped() {
        let links = Link::build(&[(0, 0), (0, 7), (1, 2)], 3, 1.0);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn stretched_link_pulls_ends_together() {
        let links = Link::build(&[(0, 1)], 2, 1.0);
        let positions = [pos2(0.0, 0.0), pos2(100.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];

        apply_links(&links, 30.0, 1.0, &positions, &mut velocities);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
    }

    #[test]
    fn compressed_link_pushes_ends_apart() {
        let links = Link::build(&[(0, 1)], 2, 1.0);
        let positions = [pos2(0.0, 0.0), pos2(5.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];

        apply_links(&links, 30.0, 1.0, &positions, &mut velocities);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
    }

    #[test]
    fn negative_charge_repels() {
        let positions = [pos2(0.0, 0.0), pos2(10.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];

        apply_charge(&positions, 1.0, charge(), &mut velocities);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 1e-5);
    }

    #[test]
    fn approximation_stays_close_to_exact_sum() {
        let positions = (0..200)
            .map(|index| pos2((index % 20) as f32 * 9.0, (index / 20) as f32 * 11.0))
            .collect::<Vec<_>>();
        let mut approximate = vec![Vec2::ZERO; positions.len()];
        apply_charge(&positions, 1.0, charge(), &mut approximate);

        let probe = 0;
        let mut exact = Vec2::ZERO;
        for (other, position) in positions.iter().enumerate() {
            if other == probe {
                continue;
            }
            let delta = *position - positions[probe];
            exact += charge_between(delta, delta.length_sq(), -50.0, charge());
        }

        let error = (approximate[probe] - exact).length() / exact.length();
        assert!(error < 0.15, "relative error {error}");
    }

    #[test]
    fn centering_moves_the_centroid() {
        let mut positions = [pos2(0.0, 0.0), pos2(10.0, 20.0)];
        apply_center(&mut positions, pos2(600.0, 300.0));

        assert_eq!(positions[0], pos2(595.0, 290.0));
        assert_eq!(positions[1], pos2(605.0, 310.0));
    }
}
