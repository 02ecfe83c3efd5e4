use gate_net::circuit::Circuit;
use gate_net::template::Template;

fn xor() -> Template {
    Template::new("xor")
        .pin("in0", "IN", "I0")
        .pin("in1", "IN", "I1")
        .gate("or", "OR")
        .gate("and", "AND")
        .gate("nand", "NOT")
        .gate("both", "AND")
        .pin("out", "OUT", "O0")
        .wire(("in0", "I0"), ("or", "I0"))
        .wire(("in0", "I0"), ("and", "I0"))
        .wire(("in1", "I1"), ("or", "I1"))
        .wire(("in1", "I1"), ("and", "I1"))
        .wire(("and", "O0"), ("nand", "I0"))
        .wire(("or", "O0"), ("both", "I0"))
        .wire(("nand", "O0"), ("both", "I1"))
        .wire(("both", "O0"), ("out", "O0"))
}

fn main() {
    let mut circuit = Circuit::build(&xor(), &[]).unwrap();

    // Drive both inputs high
    circuit.drive_input("in0", "I0", true).unwrap();
    circuit.drive_input("in1", "I1", true).unwrap();
    assert!(!circuit.read_output("out", "O0").unwrap());

    // Print the settled circuit
    println!("{circuit}");
}
