use std::path::PathBuf;
use bloch_sim::{
    mkdir,
    write_npz,
    config::SimParams,
    sequence::{ magnitude, Sequence, SpinEchoSequence },
    voxel::Voxel,
};

const T1: f64 = 1e-5; // s
const T2: f64 = 5e-6; // s
const TR: f64 = 2e-5; // s
const TE: f64 = 1e-5; // s
const NUM_REPS: usize = 10;

fn main() -> anyhow::Result<()> {
    let outdir = PathBuf::from("output/spin_echo");
    mkdir!(outdir);

    let params = SimParams::default();
    let seq = SpinEchoSequence::new(params, TR, TE, NUM_REPS)?;
    let mut voxel = Voxel::relaxed(T1, T2)?;

    println!(
        "spin echo: {} reps, tr = {:e} s, te = {:e} s",
        seq.num_reps(), TR, TE,
    );
    let signal = seq.run(&mut voxel);
    let mag = magnitude(&signal);

    write_npz!(
        outdir.join("spin_echo.npz"),
        arrays: {
            "signal" => &signal,
            "magnitude" => &mag,
        }
    );

    println!("done");
    Ok(())
}
