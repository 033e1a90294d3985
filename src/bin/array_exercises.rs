use ndarray::{Array, Array2};

use scorescope::exercises::{MemoryFootprint, checkerboard, swap_first_last_rows};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Chessboard with 0 and 1
    let board = checkerboard(10, 10);
    println!("{board}");

    let m = Array2::<f64>::zeros((1000, 1000));
    println!("{}", MemoryFootprint::of(&m));

    let mut a = Array::from_iter(0..20i64).into_shape_with_order((4, 5))?;
    println!("{a}\n");
    swap_first_last_rows(&mut a);
    println!("{a}");
    log::debug!("Swapped rows 0 and {} of a {:?} array", a.nrows() - 1, a.shape());

    Ok(())
}
