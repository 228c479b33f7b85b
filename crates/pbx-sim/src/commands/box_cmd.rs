use std::error::Error;

use clap::Args;
use pbx_box::{convert_box, BoxLike};
use serde_json::json;

#[derive(Args, Debug)]
pub struct BoxArgs {
    /// Box-like JSON value: a length, `[lx, ly]`, `[lx, ly, lz]`, a 2x2 or
    /// 3x3 matrix with lattice vectors as columns, or a parameter object.
    pub value: String,
}

pub fn run(args: &BoxArgs) -> Result<(), Box<dyn Error>> {
    let like: BoxLike = serde_json::from_str(&args.value)?;
    let sim_box = convert_box(like)?;
    let lattice: Vec<[f64; 3]> = sim_box
        .lattice_vectors()
        .iter()
        .map(|v| [v.x, v.y, v.z])
        .collect();
    let payload = json!({
        "input_kind": like.kind(),
        "box": sim_box,
        "dimensions": sim_box.dimensions(),
        "volume": sim_box.volume(),
        "lattice_vectors": lattice,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
