use std::path::PathBuf;
use bloch_sim::{
    mkdir,
    write_npz,
    config::SimParams,
    sequence::{ time_axis, transverse, FidSequence, Sequence },
    voxel::Voxel,
};

const T1: f64 = 4e-3; // s
const T2: f64 = 2e-3; // s
const T_TOTAL: f64 = 1e-5; // s

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output/fid");
    mkdir!(outdir);

    let params = SimParams::default();
    let seq = FidSequence::new(params, T_TOTAL)?;
    let mut voxel = Voxel::relaxed(T1, T2)?;

    println!("fid: {} steps at dt = {:e} s", seq.num_steps(), params.dt);
    let signal = seq.run(&mut voxel);
    let time = time_axis(seq.num_steps(), params.dt);
    let xy = transverse(&signal);

    write_npz!(
        outdir.join("fid.npz"),
        arrays: {
            "time" => &time,
            "signal" => &signal,
            "xy" => &xy,
        }
    );

    println!("done");
    Ok(())
}
