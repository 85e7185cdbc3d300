// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end tests: build, edit, persist and compile graphs through the public API.

use noisegraph::{
    Axis, CompilerConfig, Dimensions, Expression, Graph, MathOp, NodeKind, NodeUid, NoiseKind,
    NoiseNode, ReferenceSite, ShaderCompiler, WorleyFormulas,
};
use std::collections::HashSet;

fn white_power_graph() -> (Graph, NodeUid, NodeUid) {
    let mut graph = Graph::new("demo");
    let noise = graph.add_node(NodeKind::Noise(NoiseNode::new(NoiseKind::White, Dimensions::One))).unwrap();
    graph.set_input_by_name(noise, "X", 234.1241f32).unwrap();
    let power = graph.add_node(NodeKind::Math(MathOp::Power)).unwrap();
    graph.set_input_by_name(power, "Base", noise).unwrap();
    graph.set_input_by_name(power, "Exponent", 3.0f32).unwrap();
    graph.set_output(power);
    (graph, noise, power)
}

/// Small deterministic generator so graph shapes are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// Random DAG: every reference points at an earlier node
fn random_graph(seed: u64, size: usize) -> Graph {
    let mut rng = Lcg(seed);
    let catalog = NodeKind::catalog();
    let mut graph = Graph::new(format!("random-{seed}"));
    let mut uids = Vec::new();
    for _ in 0..size {
        let kind = catalog[rng.next(catalog.len())].clone();
        let slots = kind.slot_specs().len();
        let uid = graph.add_node(kind).unwrap();
        for slot in 0..slots {
            if !uids.is_empty() && rng.next(3) > 0 {
                let target = uids[rng.next(uids.len())];
                graph.set_input(uid, slot, target).unwrap();
            }
        }
        uids.push(uid);
    }
    if let Some(last) = uids.last() {
        graph.set_output(*last);
    }
    graph
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
}

#[test]
fn test_white_noise_power_end_to_end() {
    let (graph, noise, power) = white_power_graph();
    let compiled = graph.compile().unwrap();
    assert_eq!(
        compiled.statements,
        [
            "float WhiteNoise1D_0 = 1.0 * hashValue1(1.0 * 234.1241);",
            "float Power_1 = pow(WhiteNoise1D_0, 3.0);",
        ]
    );
    assert_eq!(compiled.output, "float result = Power_1;");

    for loaded in [
        Graph::from_ron(&graph.to_ron().unwrap()).unwrap(),
        Graph::from_bytes(&graph.to_bytes().unwrap()).unwrap(),
    ] {
        let loaded_noise = loaded.node(noise).unwrap();
        assert_eq!(loaded_noise.kind().type_id(), "WhiteNoise1");
        let exponent = loaded.node(power).unwrap().inputs()[1].expression;
        assert_eq!(exponent.constant().map(f32::to_bits), Some(3.0f32.to_bits()));
        assert_eq!(loaded.output(), Expression::Node(power));
        assert_eq!(loaded.compile().unwrap(), compiled);
    }
}

#[test]
fn test_declarations_precede_uses() {
    for seed in 0..25 {
        let graph = random_graph(seed, 40);
        let compiled = graph.compile().unwrap();
        let variables: HashSet<String> = graph.nodes().map(|node| node.variable_name()).collect();

        let mut declared = HashSet::new();
        for (uid, statement) in compiled.order.iter().zip(&compiled.statements) {
            let variable = graph.node(*uid).unwrap().variable_name();
            let (_, value) = statement.split_once('=').unwrap();
            for token in tokens(value) {
                if variables.contains(token) {
                    assert!(declared.contains(token), "seed {seed}: {token} used before declaration in {statement}");
                }
            }
            declared.insert(variable);
        }
        for token in tokens(&compiled.output) {
            if variables.contains(token) {
                assert!(declared.contains(token), "seed {seed}: output uses undeclared {token}");
            }
        }
    }
}

#[test]
fn test_unreachable_nodes_are_not_emitted() {
    let (mut graph, _, _) = white_power_graph();
    let before = graph.compile().unwrap();

    let orphan = graph.add_node(NodeKind::Noise(NoiseNode::worley(
        Dimensions::Three,
        WorleyFormulas::new("distance($1, $2)", "$2"),
    ))).unwrap();
    let sink = graph.add_node(NodeKind::Math(MathOp::Sin)).unwrap();
    graph.set_input(sink, 0, orphan).unwrap();

    let after = graph.compile().unwrap();
    assert_eq!(after.statements, before.statements);
    assert_eq!(after.output, before.output);
    assert!(after.helpers.is_empty());
}

#[test]
fn test_compilation_is_deterministic() {
    let graph = random_graph(7, 60);
    let compiler = ShaderCompiler::default();
    let first = compiler.compile(&graph).unwrap();
    let rebuilt = Graph::from_bytes(&graph.to_bytes().unwrap()).unwrap();
    let second = compiler.compile(&rebuilt).unwrap();
    assert_eq!(first.text, second.text);
    assert_eq!(first.parameters, second.parameters);
}

#[test]
fn test_worley_helpers_shared_and_per_node() {
    let mut graph = Graph::new("cells");
    let plain_a = graph.add_node(NodeKind::Noise(NoiseNode::new(NoiseKind::Worley, Dimensions::Two))).unwrap();
    let plain_b = graph.add_node(NodeKind::Noise(NoiseNode::new(NoiseKind::Worley, Dimensions::Two))).unwrap();
    let custom = WorleyFormulas::new("abs($1.x - $2.x) + abs($1.y - $2.y)", "$2 - $1");
    let custom_a = graph.add_node(NodeKind::Noise(NoiseNode::worley(Dimensions::Two, custom.clone()))).unwrap();
    let custom_b = graph.add_node(NodeKind::Noise(NoiseNode::worley(Dimensions::Two, custom))).unwrap();

    let mut sum = None;
    for uid in [plain_a, plain_b, custom_a, custom_b] {
        let add = graph.add_node(NodeKind::Math(MathOp::Add)).unwrap();
        graph.set_input(add, 0, uid).unwrap();
        if let Some(previous) = sum {
            graph.set_input(add, 1, previous).unwrap();
        }
        sum = Some(add);
    }
    graph.set_output(sum.unwrap());

    let compiled = graph.compile().unwrap();
    assert_eq!(compiled.helpers.len(), 2);
    for uid in [custom_a, custom_b] {
        assert!(compiled.helpers.iter().any(|helper| helper.contains(&format!("float Worley_{uid}("))));
        assert!(compiled.helpers.iter().any(|helper| helper.contains(&format!("#undef WORLEY_DISTANCE_{uid}"))));
        assert!(compiled.helpers.iter().any(|helper| helper.contains(&format!("#undef WORLEY_COMBINE_{uid}"))));
    }
    let shared = compiled
        .statements
        .iter()
        .filter(|statement| statement.contains("WorleyNoise2("))
        .count();
    assert_eq!(shared, 2);
}

#[test]
fn test_reconfigure_worley_keeps_wiring() {
    let mut graph = Graph::new("reshape");
    let x = graph.add_node(NodeKind::Coordinate(Axis::X)).unwrap();
    let y = graph.add_node(NodeKind::Coordinate(Axis::Y)).unwrap();
    let cells = graph.add_node(NodeKind::Noise(NoiseNode::new(NoiseKind::Worley, Dimensions::Two))).unwrap();
    graph.set_input_by_name(cells, "X", x).unwrap();
    graph.set_input_by_name(cells, "Y", y).unwrap();
    graph.set_input_by_name(cells, "Scale", 4.0f32).unwrap();
    graph.set_output(cells);

    graph
        .reconfigure(cells, NodeKind::Noise(NoiseNode::new(NoiseKind::Worley, Dimensions::Three)))
        .unwrap();

    let node = graph.node(cells).unwrap();
    assert_eq!(node.name(), "Worley Noise 3D");
    assert_eq!(node.inputs().len(), 8);
    assert_eq!(node.input(0).unwrap().expression, Expression::Node(x));
    assert_eq!(node.input(1).unwrap().expression, Expression::Node(y));
    assert_eq!(node.input(2).unwrap().expression, Expression::Constant(0.0));
    assert_eq!(node.input(3).unwrap().expression, Expression::Constant(4.0));

    let compiled = graph.compile().unwrap();
    assert!(compiled.statements[2].contains("4.0 * float3(CoordinateX_0, CoordinateY_1, 0.0)"));
    assert_eq!(compiled.seed_components, 2);
}

#[test]
fn test_removal_rewrites_references_and_never_reuses_uids() {
    let (mut graph, noise, power) = white_power_graph();
    let abs = graph.add_node(NodeKind::Math(MathOp::Abs)).unwrap();
    graph.set_input(abs, 0, noise).unwrap();

    let removal = graph.remove_node(noise).unwrap();
    assert_eq!(
        removal.rewritten,
        [
            ReferenceSite::Slot { node: power, slot: 0 },
            ReferenceSite::Slot { node: abs, slot: 0 },
        ]
    );
    assert_eq!(graph.node(power).unwrap().inputs()[0].expression, Expression::Constant(0.0));

    let replacement = graph.add_node(NodeKind::Math(MathOp::Abs)).unwrap();
    assert_eq!(replacement, NodeUid(3));
    assert!(!graph.contains(noise));

    let mut reloaded = Graph::from_ron(&graph.to_ron().unwrap()).unwrap();
    assert_eq!(reloaded.add_node(NodeKind::Math(MathOp::Abs)).unwrap(), NodeUid(4));
}

#[test]
fn test_source_unit_signature_lists_parameters() {
    let (graph, _, _) = white_power_graph();
    let compiler = ShaderCompiler::new(CompilerConfig {
        function_name: "Demo".to_string(),
        ..CompilerConfig::default()
    });
    let unit = compiler.compile(&graph).unwrap();
    let identifiers: Vec<&str> = unit.parameters.iter().map(|p| p.identifier.as_str()).collect();
    assert_eq!(
        identifiers,
        [
            "param_WhiteNoise1D_X",
            "param_WhiteNoise1D_Scale",
            "param_WhiteNoise1D_Weight",
            "param_Power_Exponent",
        ]
    );
    assert!(unit.text.contains(
        "float Demo(float pos, float param_WhiteNoise1D_X, float param_WhiteNoise1D_Scale, \
         float param_WhiteNoise1D_Weight, float param_Power_Exponent)"
    ));
    assert!(unit.text.contains("float Power_1 = pow(WhiteNoise1D_0, param_Power_Exponent);"));
    assert!(unit.text.trim_end().ends_with("return result;\n}"));
}
