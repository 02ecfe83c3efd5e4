#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`gate-net`

Combinational logic circuits built from AND, OR and NOT gates plus named IN and
OUT pins. Any built [circuit::Circuit] can be instantiated as a gate inside
another one, so larger designs are composed from reusable blocks.

A circuit is built from an already-parsed [template::Template] and a set of
dependency circuits. Driving an IN pin with [circuit::Circuit::drive_input]
propagates the change through every downstream gate before returning.

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/xor.rs")]
#![doc = "\n```"]

pub mod circuit;
pub mod config;
pub mod container;
pub mod error;
pub mod gate;
pub mod graph;
pub mod port;
pub mod table;
pub mod template;
pub mod util;
