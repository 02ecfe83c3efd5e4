use gate_net::circuit::Library;
use gate_net::table::TruthTable;
use gate_net::template::Template;

fn xor() -> Template {
    Template::new("xor")
        .pin("a", "IN", "A")
        .pin("b", "IN", "B")
        .gate("or", "OR")
        .gate("and", "AND")
        .gate("nand", "NOT")
        .gate("both", "AND")
        .pin("y", "OUT", "Y")
        .wire(("a", "A"), ("or", "I0"))
        .wire(("a", "A"), ("and", "I0"))
        .wire(("b", "B"), ("or", "I1"))
        .wire(("b", "B"), ("and", "I1"))
        .wire(("and", "O0"), ("nand", "I0"))
        .wire(("or", "O0"), ("both", "I0"))
        .wire(("nand", "O0"), ("both", "I1"))
        .wire(("both", "O0"), ("y", "Y"))
}

fn half_adder() -> Template {
    Template::new("half_adder")
        .pin("a", "IN", "A")
        .pin("b", "IN", "B")
        .gate("sum", "xor")
        .gate("carry", "AND")
        .pin("s", "OUT", "S")
        .pin("c", "OUT", "C")
        .wire(("a", "A"), ("sum", "A"))
        .wire(("b", "B"), ("sum", "B"))
        .wire(("a", "A"), ("carry", "I0"))
        .wire(("b", "B"), ("carry", "I1"))
        .wire(("sum", "Y"), ("s", "S"))
        .wire(("carry", "O0"), ("c", "C"))
}

fn main() {
    let mut library = Library::default();
    library.build(&xor()).unwrap();
    let adder = library.build(&half_adder()).unwrap();

    print!("{}", TruthTable::build(adder).unwrap());
}
