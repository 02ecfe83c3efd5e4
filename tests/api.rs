use gate_net::assert_dump_eq;
use gate_net::circuit::Circuit;
use gate_net::error::Error;
use gate_net::format_id;
use gate_net::gate::{GateType, Primitive};
use gate_net::graph::{CombDepth, FanOutTable};
use gate_net::port::Direction;
use gate_net::template::Template;

fn inverter() -> Template {
    Template::new("inv")
        .pin("a", "IN", "A")
        .gate("n", "NOT")
        .pin("y", "OUT", "Y")
        .wire(("a", "A"), ("n", "I0"))
        .wire(("n", "O0"), ("y", "Y"))
}

#[test]
fn test_dump() {
    let circuit = Circuit::build(&inverter(), &[]).unwrap();
    assert_dump_eq!(
        circuit.to_string(),
        "circuit inv (
            { a [IN] }
                A (output) = 0
            { n [NOT] }
                I0 (input) = 0
                O0 (output) = 1
            { y [OUT] }
                Y (input) = 1
        )"
    );
}

#[test]
fn test_lookup_misses() {
    let mut circuit = Circuit::build(&inverter(), &[]).unwrap();
    assert!(circuit.get_port_by_name("a", "A").is_some());
    assert!(circuit.get_port_by_name("ghost", "A").is_none());
    assert!(circuit.get_port_by_name("a", "ghost").is_none());
    assert!(circuit.find_port("n", "O1").is_none());

    assert_eq!(
        circuit.read_output("y", "Q"),
        Err(Error::PortNotFound {
            gate: "y".into(),
            port: "Q".into()
        })
    );
    assert!(matches!(
        circuit.drive_input("b", "A", true),
        Err(Error::PortNotFound { .. })
    ));
    // A failed lookup leaves the circuit alone
    assert_eq!(circuit.read_output("y", "Y"), Ok(true));
}

#[test]
fn test_ports_belong_to_their_gate() {
    let circuit = Circuit::build(&inverter(), &[]).unwrap();
    for gate in circuit.gates() {
        for port in gate.ports() {
            assert_eq!(port.get_owner(), gate.get_index());
        }
    }
    let n = circuit.get_gate("n").unwrap();
    assert_eq!(n.get_type(), &GateType::Primitive(Primitive::Not));
    assert_eq!(
        n.ports().map(|p| p.get_direction()).collect::<Vec<_>>(),
        [Direction::Input, Direction::Output]
    );
}

/// Every wire carries the state of its driver
fn assert_settled(circuit: &Circuit) {
    for c in circuit.connections() {
        assert_eq!(
            circuit.state(c.src()),
            circuit.state(c.target()),
            "{} -> {}",
            c.src(),
            c.target()
        );
    }
}

#[test]
fn test_settled_after_every_change() {
    let t = inverter().gate("m", "NOT").wire(("n", "O0"), ("m", "I0"));
    let mut circuit = Circuit::build(&t, &[]).unwrap();
    assert_settled(&circuit);
    assert_eq!(circuit.read_output("m", "O0"), Ok(false));

    for state in [true, false, true] {
        circuit.drive_input("a", "A", state).unwrap();
        assert_settled(&circuit);
        assert_eq!(circuit.read_output("m", "O0"), Ok(state));
    }
}

#[test]
fn test_set_input_port() {
    let mut circuit = Circuit::build(&inverter(), &[]).unwrap();
    let n_in = circuit.find_port("n", "I0").unwrap();

    // Driving a gate's INPUT port re-evaluates that gate
    circuit.set_state(n_in, true).unwrap();
    assert_eq!(circuit.read_output("n", "O0"), Ok(false));
    assert_eq!(circuit.read_output("y", "Y"), Ok(false));

    circuit.set_state(n_in, false).unwrap();
    assert_eq!(circuit.read_output("y", "Y"), Ok(true));
}

#[test]
fn test_drive_only_external_inputs() {
    let mut circuit = Circuit::build(&inverter(), &[]).unwrap();
    assert_eq!(
        circuit.drive_input("n", "O0", false),
        Err(Error::NotAnInputPin {
            gate: "n".into(),
            port: "O0".into()
        })
    );
    assert!(matches!(
        circuit.drive_input("y", "Y", false),
        Err(Error::NotAnInputPin { .. })
    ));
    // Nothing was touched
    assert_eq!(circuit.read_output("n", "O0"), Ok(true));
    assert_eq!(circuit.read_output("y", "Y"), Ok(true));
    assert_settled(&circuit);
}

#[test]
fn test_verify() {
    let t = Template::new("sink")
        .pin("a", "IN", "A")
        .gate("n", "NOT")
        .wire(("a", "A"), ("n", "I0"));
    let circuit = Circuit::build(&t, &[]).unwrap();
    assert_eq!(
        circuit.verify(),
        Err(Error::NoOutputs("sink".to_string()))
    );
}

#[test]
fn test_inverter_chain() {
    let mut t = Template::new("chain").pin("a", "IN", "A");
    let mut prev = format_id!("a");
    let mut prev_port = "A";
    for i in 0..9 {
        let id = format_id!("n{i}");
        t = t
            .gate(id.get_name(), "NOT")
            .wire((prev.get_name(), prev_port), (id.get_name(), "I0"));
        prev = id;
        prev_port = "O0";
    }
    t = t
        .pin("y", "OUT", "Y")
        .wire((prev.get_name(), prev_port), ("y", "Y"));

    let mut circuit = Circuit::build(&t, &[]).unwrap();
    assert_eq!(circuit.read_output("y", "Y"), Ok(true));
    circuit.drive_input("a", "A", true).unwrap();
    assert_eq!(circuit.read_output("y", "Y"), Ok(false));

    let depth = circuit.get_analysis::<CombDepth>().unwrap();
    assert_eq!(depth.get_max_depth(), 9);
    let fo = circuit.get_analysis::<FanOutTable>().unwrap();
    let n8 = circuit.find_gate("n8").unwrap();
    assert_eq!(
        fo.get_gate_users(&n8).collect::<Vec<_>>(),
        [circuit.find_gate("y").unwrap()]
    );
    assert_eq!(circuit.dfs(circuit.find_gate("y").unwrap()).count(), 11);
}

#[cfg(feature = "serde")]
#[test]
fn test_template_json() {
    let json = r#"{
        "name": "buf",
        "gates": [
            { "id": "a", "gate_type": "IN", "pin": "A" },
            { "id": "y", "gate_type": "OUT", "pin": "Y" }
        ],
        "wires": [
            { "from": { "gate": "a", "port": "A" }, "to": [{ "gate": "y", "port": "Y" }] }
        ]
    }"#;
    let t = Template::from_json(json.as_bytes()).unwrap();
    let mut circuit = Circuit::build(&t, &[]).unwrap();
    circuit.drive_input("a", "A", true).unwrap();
    assert_eq!(circuit.read_output("y", "Y"), Ok(true));
}
