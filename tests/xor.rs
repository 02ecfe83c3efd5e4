use gate_net::circuit::Circuit;
use gate_net::port::Direction;
use gate_net::table::TruthTable;
use gate_net::template::Template;
use rstest::rstest;

const IN0: &str = "5cf6cdaa";
const IN1: &str = "3958dd83";
const OUT: &str = "961b5519";

/// (a OR b) AND NOT (a AND b)
fn xor() -> Template {
    Template::new("xor")
        .pin(IN0, "IN", "I0")
        .pin(IN1, "IN", "I1")
        .gate("or", "OR")
        .gate("and", "AND")
        .gate("nand", "NOT")
        .gate("both", "AND")
        .pin(OUT, "OUT", "O0")
        .wire((IN0, "I0"), ("or", "I0"))
        .wire((IN0, "I0"), ("and", "I0"))
        .wire((IN1, "I1"), ("or", "I1"))
        .wire((IN1, "I1"), ("and", "I1"))
        .wire(("and", "O0"), ("nand", "I0"))
        .wire(("or", "O0"), ("both", "I0"))
        .wire(("nand", "O0"), ("both", "I1"))
        .wire(("both", "O0"), (OUT, "O0"))
}

fn get_xor() -> Circuit {
    Circuit::build(&xor(), &[]).unwrap()
}

#[test]
fn test_pins() {
    let circuit = get_xor();
    let i0 = circuit.get_port_by_name(IN0, "I0").unwrap();
    let i1 = circuit.get_port_by_name(IN1, "I1").unwrap();
    let o0 = circuit.get_port_by_name(OUT, "O0").unwrap();

    assert_eq!(i0.get_direction(), Direction::Output);
    assert_eq!(i1.get_direction(), Direction::Output);
    assert_eq!(o0.get_direction(), Direction::Input);

    // Inputs start low
    assert!(!i0.get_state());
    assert!(!i1.get_state());
    assert!(!o0.get_state());
}

#[rstest]
#[case(false, false, false)]
#[case(true, false, true)]
#[case(false, true, true)]
#[case(true, true, false)]
fn test_xor(#[case] a: bool, #[case] b: bool, #[case] expected: bool) {
    let mut circuit = get_xor();
    circuit.drive_input(IN0, "I0", a).unwrap();
    circuit.drive_input(IN1, "I1", b).unwrap();
    assert_eq!(circuit.read_output(OUT, "O0"), Ok(expected));
}

#[test]
fn test_sequence_settles() {
    let mut circuit = get_xor();
    // Walk every transition between assignments, including repeats
    let sequence = [
        (false, false),
        (true, false),
        (true, true),
        (false, true),
        (false, false),
        (true, true),
        (true, true),
        (false, true),
        (true, false),
    ];
    for (a, b) in sequence {
        circuit.drive_input(IN0, "I0", a).unwrap();
        circuit.drive_input(IN1, "I1", b).unwrap();
        assert_eq!(circuit.read_output(OUT, "O0"), Ok(a != b), "{a} {b}");
        assert_eq!(circuit.read_output("and", "O0"), Ok(a && b));
        assert_eq!(circuit.read_output("nand", "O0"), Ok(!(a && b)));
    }
}

#[test]
fn test_idempotent_drive() {
    let mut circuit = get_xor();
    circuit.drive_input(IN0, "I0", true).unwrap();
    let before = circuit.to_string();
    circuit.drive_input(IN0, "I0", true).unwrap();
    circuit.drive_input(IN1, "I1", false).unwrap();
    assert_eq!(circuit.to_string(), before);
    assert_eq!(circuit.read_output(OUT, "O0"), Ok(true));
}

#[test]
fn test_truth_table() {
    let circuit = get_xor();
    let table = TruthTable::build(&circuit).unwrap();
    let column = table.get_column("O0").unwrap();
    let bits: Vec<bool> = column.iter().map(|b| *b).collect();
    assert_eq!(bits, [false, true, true, false]);
    assert_eq!(table.to_string(), "O0 = 4'b0110\n");
}

#[test]
fn test_verify() {
    let circuit = get_xor();
    assert!(circuit.verify().is_ok());
}
