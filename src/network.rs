// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;

use crate::assets::Image;
use crate::palette::{LABEL, LINK, TRAFFIC};
use crate::rng::RandomSource;
use crate::surface::{Rgb, Surface};

pub const HIGHLIGHT_DECAY: f32 = 0.2;
pub const SKULL_PX: f32 = 24.0;
// Packet progress advances by `speed * dt / PROGRESS_DIVISOR` per update, so
// `speed` is a tuned rate constant rather than pixels per second.
pub const PROGRESS_DIVISOR: f32 = 1000.0;
const TRAFFIC_MIN_S: f32 = 0.3;
const TRAFFIC_MAX_S: f32 = 1.0;
const TRAFFIC_SPEED_MIN: f32 = 120.0;
const TRAFFIC_SPEED_MAX: f32 = 240.0;
const GLOW_R: f32 = 14.0;
const CORE_R: f32 = 4.0;
const PACKET_R: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Hacker,
    Server,
    Desktop,
    Router,
    Laptop,
    Phone,
    Iot,
    Cloud,
}

impl NodeKind {
    pub fn color(self) -> Rgb {
        match self {
            NodeKind::Hacker => Rgb::hex(0xff3355),
            NodeKind::Server => Rgb::hex(0x33aaff),
            NodeKind::Desktop => Rgb::hex(0x66ddff),
            NodeKind::Router => Rgb::hex(0xffcc33),
            NodeKind::Laptop => Rgb::hex(0x99ff66),
            NodeKind::Phone => Rgb::hex(0xcc88ff),
            NodeKind::Iot => Rgb::hex(0xff9944),
            NodeKind::Cloud => Rgb::hex(0xddeeff),
        }
    }
}

const LAYOUT: [(&str, NodeKind, f32, f32); 9] = [
    ("hacker", NodeKind::Hacker, 0.12, 0.78),
    ("router", NodeKind::Router, 0.55, 0.47),
    ("server1", NodeKind::Server, 0.82, 0.22),
    ("server2", NodeKind::Server, 0.88, 0.52),
    ("desktop1", NodeKind::Desktop, 0.30, 0.22),
    ("laptop1", NodeKind::Laptop, 0.30, 0.62),
    ("phone1", NodeKind::Phone, 0.62, 0.84),
    ("iot1", NodeKind::Iot, 0.84, 0.80),
    ("cloud1", NodeKind::Cloud, 0.55, 0.12),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    hacked: f32,
}

impl Node {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            x: 0.0,
            y: 0.0,
            hacked: 0.0,
        }
    }

    // The "recently compromised" glow, always in `[0, 1]`.
    pub fn hacked(&self) -> f32 {
        self.hacked
    }

    pub fn set_hacked(&mut self, v: f32) {
        self.hacked = v.clamp(0.0, 1.0);
    }

    fn is_target_candidate(&self) -> bool {
        !matches!(self.kind, NodeKind::Hacker | NodeKind::Router)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    pub id: PacketId,
    pub link: Link,
    pub t: f32,
    pub speed: f32,
    pub color: Rgb,
}

pub struct NodeNetwork {
    nodes: Vec<Node>,
    by_id: HashMap<String, usize>,
    links: Vec<Link>,
    packets: Vec<Packet>,
    next_packet: u64,
    traffic_timer: f32,
    rng: Box<dyn RandomSource>,
}

impl NodeNetwork {
    pub fn new(mut rng: Box<dyn RandomSource>) -> Self {
        let nodes: Vec<Node> = LAYOUT
            .iter()
            .map(|&(id, kind, _, _)| Node::new(id, kind))
            .collect();
        let traffic_timer = rng.range(TRAFFIC_MIN_S, TRAFFIC_MAX_S);
        Self::with_nodes(nodes, rng, traffic_timer)
    }

    pub fn with_nodes(nodes: Vec<Node>, rng: Box<dyn RandomSource>, traffic_timer: f32) -> Self {
        let by_id = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let mut links = Vec::new();
        if let Some(hub) = nodes.iter().position(|n| n.kind == NodeKind::Router) {
            for (i, n) in nodes.iter().enumerate() {
                match n.kind {
                    NodeKind::Router => {}
                    NodeKind::Hacker => links.push(Link { from: i, to: hub }),
                    _ => links.push(Link { from: hub, to: i }),
                }
            }
        }
        Self {
            nodes,
            by_id,
            links,
            packets: Vec::new(),
            next_packet: 0,
            traffic_timer,
            rng,
        }
    }

    pub fn setup_layout(&mut self, width: f32, height: f32) {
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let (fx, fy) = LAYOUT
                .iter()
                .find(|(id, ..)| *id == node.id)
                .map(|&(_, _, fx, fy)| (fx, fy))
                .unwrap_or_else(|| fallback_offset(i));
            node.x = width * fx;
            node.y = height * fy;
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn set_hacked(&mut self, index: usize, v: f32) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.set_hacked(v);
        }
    }

    pub fn packet(&self, id: PacketId) -> Option<&Packet> {
        self.packets.iter().find(|p| p.id == id)
    }

    pub fn hacker(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.kind == NodeKind::Hacker)
    }

    pub fn target_candidates(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_target_candidate())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn send_packet_between(
        &mut self,
        from: usize,
        to: usize,
        color: Rgb,
        speed: f32,
    ) -> Option<PacketId> {
        if from >= self.nodes.len() || to >= self.nodes.len() {
            return None;
        }
        let id = PacketId(self.next_packet);
        self.next_packet += 1;
        self.packets.push(Packet {
            id,
            link: Link { from, to },
            t: 0.0,
            speed,
            color,
        });
        Some(id)
    }

    // Unknown ids are ignored and no packet is created.
    pub fn send_packet(
        &mut self,
        from_id: &str,
        to_id: &str,
        color: Rgb,
        speed: f32,
    ) -> Option<PacketId> {
        let (Some(from), Some(to)) = (self.index_of(from_id), self.index_of(to_id)) else {
            log::debug!("dropping packet {} -> {}: unknown endpoint", from_id, to_id);
            return None;
        };
        self.send_packet_between(from, to, color, speed)
    }

    fn emit_traffic(&mut self) {
        let (Some(hub), candidates) = (
            self.nodes.iter().position(|n| n.kind == NodeKind::Router),
            self.target_candidates(),
        ) else {
            return;
        };
        if candidates.is_empty() {
            return;
        }
        let target = candidates[self.rng.index(candidates.len())];
        let out = self.rng.range(TRAFFIC_SPEED_MIN, TRAFFIC_SPEED_MAX);
        let back = self.rng.range(TRAFFIC_SPEED_MIN, TRAFFIC_SPEED_MAX);
        self.send_packet_between(hub, target, TRAFFIC, out);
        self.send_packet_between(target, hub, TRAFFIC, back);
    }

    pub fn update(&mut self, dt: f32) {
        for n in &mut self.nodes {
            n.set_hacked(n.hacked - HIGHLIGHT_DECAY * dt);
        }

        self.traffic_timer -= dt;
        if self.traffic_timer <= 0.0 {
            self.traffic_timer = self.rng.range(TRAFFIC_MIN_S, TRAFFIC_MAX_S);
            self.emit_traffic();
        }

        for p in &mut self.packets {
            p.t += (p.speed * dt) / PROGRESS_DIVISOR;
        }
        self.packets.retain(|p| p.t < 1.0);
    }

    pub fn draw(&self, surface: &mut dyn Surface, skull: Option<&Image>) {
        surface.save();

        surface.set_alpha(0.35);
        for l in &self.links {
            let (a, b) = (&self.nodes[l.from], &self.nodes[l.to]);
            surface.stroke_line(a.x, a.y, b.x, b.y, LINK);
        }

        surface.set_alpha(1.0);
        for p in &self.packets {
            let (a, b) = (&self.nodes[p.link.from], &self.nodes[p.link.to]);
            let t = p.t.clamp(0.0, 1.0);
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            surface.fill_circle(x, y, PACKET_R, p.color);
        }

        for n in &self.nodes {
            let color = n.kind.color();
            surface.set_alpha(0.25);
            surface.fill_circle(n.x, n.y, GLOW_R, color);
            surface.set_alpha(1.0);
            surface.fill_circle(n.x, n.y, CORE_R, color);
            surface.set_alpha(0.7);
            let half = n.id.chars().count() as f32 * 4.0;
            surface.fill_text(&n.id, n.x - half, n.y + GLOW_R, LABEL);

            if n.hacked() > 0.0 {
                if let Some(img) = skull {
                    surface.set_alpha(n.hacked());
                    surface.draw_image(
                        img,
                        n.x - SKULL_PX / 2.0,
                        n.y - SKULL_PX / 2.0,
                        SKULL_PX,
                        SKULL_PX,
                    );
                }
            }
        }

        surface.restore();
    }
}

fn fallback_offset(i: usize) -> (f32, f32) {
    let k = (i % 8) as f32;
    (0.1 + 0.1 * k, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::fixed;
    use crate::surface::testing::{Op, RecordingSurface};

    fn network() -> NodeNetwork {
        let mut net = NodeNetwork::new(fixed(0.0));
        net.setup_layout(1000.0, 500.0);
        net
    }

    #[test]
    fn topology_is_a_star_around_the_router() {
        let net = network();
        assert_eq!(net.nodes().len(), 9);
        let hub = net.index_of("router").unwrap();
        let hacker = net.index_of("hacker").unwrap();
        assert_eq!(net.links().len(), 8);
        assert!(net.links().contains(&Link { from: hacker, to: hub }));
        for (i, n) in net.nodes().iter().enumerate() {
            if i != hub && i != hacker {
                assert!(net.links().contains(&Link { from: hub, to: i }), "{}", n.id);
            }
        }
        assert_eq!(net.target_candidates().len(), 7);
    }

    #[test]
    fn layout_uses_proportional_offsets() {
        let net = network();
        let r = &net.nodes()[net.index_of("router").unwrap()];
        assert_eq!((r.x, r.y), (550.0, 235.0));
    }

    #[test]
    fn relayout_moves_nodes_without_replacing_them() {
        let mut net = network();
        let id = net
            .send_packet("router", "desktop1", TRAFFIC, 180.0)
            .unwrap();
        net.setup_layout(2000.0, 1000.0);
        assert_eq!(net.nodes().len(), 9);
        assert_eq!(net.nodes()[4].id, "desktop1");
        assert_eq!(net.nodes()[4].x, 600.0);
        assert!(net.packet(id).is_some());
    }

    #[test]
    fn send_packet_creates_one_packet_at_zero() {
        let mut net = network();
        let before = net.packets().len();
        let id = net.send_packet("router", "desktop1", Rgb::hex(0x00ff88), 180.0);
        assert!(id.is_some());
        assert_eq!(net.packets().len(), before + 1);
        let p = net.packets().last().unwrap();
        assert_eq!(p.t, 0.0);
        assert_eq!(p.speed, 180.0);
        assert_eq!(p.color, Rgb::hex(0x00ff88));
    }

    #[test]
    fn send_packet_with_unknown_id_is_a_no_op() {
        let mut net = network();
        assert!(net.send_packet("router", "mainframe", TRAFFIC, 180.0).is_none());
        assert!(net.send_packet("nobody", "router", TRAFFIC, 180.0).is_none());
        assert!(net.packets().is_empty());
    }

    #[test]
    fn packets_advance_monotonically_and_leave_at_one() {
        let mut net = NodeNetwork::with_nodes(
            vec![Node::new("a", NodeKind::Router), Node::new("b", NodeKind::Server)],
            fixed(0.0),
            f32::MAX,
        );
        let id = net.send_packet("a", "b", TRAFFIC, 250.0).unwrap();
        let mut last = 0.0;
        for _ in 0..3 {
            net.update(1.0);
            let t = net.packet(id).unwrap().t;
            assert!(t > last);
            last = t;
        }
        assert!((last - 0.75).abs() < 1e-6);
        net.update(1.0);
        assert!(net.packet(id).is_none());
    }

    #[test]
    fn highlight_decays_and_stays_clamped() {
        let mut net = network();
        net.set_hacked(0, 3.0);
        assert_eq!(net.nodes()[0].hacked(), 1.0);
        net.update(1.0);
        assert!((net.nodes()[0].hacked() - 0.8).abs() < 1e-6);
        for _ in 0..10 {
            net.update(1.0);
        }
        assert!(net.nodes().iter().all(|n| n.hacked() == 0.0));
        net.set_hacked(1, -1.0);
        assert_eq!(net.nodes()[1].hacked(), 0.0);
    }

    #[test]
    fn traffic_sends_a_round_trip_pair() {
        let mut net = network();
        net.update(0.3);
        let hub = net.index_of("router").unwrap();
        let pk = net.packets();
        assert_eq!(pk.len(), 2);
        assert_eq!(pk[0].link.from, hub);
        assert_eq!(pk[1].link.to, hub);
        assert_eq!(pk[0].link.to, pk[1].link.from);
        assert_eq!(pk[0].color, TRAFFIC);
        assert!(net.nodes()[pk[0].link.to].is_target_candidate());
    }

    #[test]
    fn skull_follows_highlight_and_asset_availability() {
        let skull = Image::parse("skull", "x", Rgb::hex(0xff0000)).unwrap();
        let mut net = network();
        net.set_hacked(2, 0.4);

        let mut s = RecordingSurface::new(1000.0, 500.0);
        net.draw(&mut s, Some(&skull));
        let images: Vec<&Op> = s
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Image { .. }))
            .collect();
        assert_eq!(images.len(), 1);
        let n = &net.nodes()[2];
        assert_eq!(
            images[0],
            &Op::Image {
                alpha: 0.4,
                x: n.x - 12.0,
                y: n.y - 12.0,
                w: 24.0,
                h: 24.0
            }
        );

        let mut s = RecordingSurface::new(1000.0, 500.0);
        net.draw(&mut s, None);
        assert!(!s.ops.iter().any(|op| matches!(op, Op::Image { .. })));
        assert_eq!(s.depth(), 0);
    }
}
