use std::sync::Arc;

use perch::{AttackTables, Board, MoveGenerator, ZobristKeys, START_FEN};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn setup(fen: &str) -> anyhow::Result<(MoveGenerator, Board)> {
    let generator = MoveGenerator::new(Arc::new(AttackTables::new()));
    let board = Board::from_fen(fen, Arc::new(ZobristKeys::default()))?;
    Ok((generator, board))
}

fn check_counts(fen: &str, expected: &[u64]) -> anyhow::Result<()> {
    let (generator, mut board) = setup(fen)?;
    let before = board.clone();
    for (depth, &nodes) in expected.iter().enumerate() {
        let depth = depth as u32 + 1;
        assert_eq!(generator.perft(&mut board, depth), nodes, "{fen} at depth {depth}");
    }
    assert_eq!(board, before);
    assert_eq!(board.to_fen(), fen);
    Ok(())
}

#[test]
fn test_perft_start_position() -> anyhow::Result<()> {
    check_counts(START_FEN, &[20, 400, 8902, 197_281])
}

#[test]
fn test_perft_kiwipete() -> anyhow::Result<()> {
    check_counts(KIWIPETE, &[48, 2039, 97_862])
}

#[test]
fn test_perft_endgame_with_en_passant_pins() -> anyhow::Result<()> {
    check_counts(POSITION_3, &[14, 191, 2812])
}

#[test]
fn test_perft_promotions_and_castling_black() -> anyhow::Result<()> {
    check_counts(POSITION_4, &[6, 264, 9467])
}

#[test]
fn test_perft_position_5() -> anyhow::Result<()> {
    check_counts(POSITION_5, &[44, 1486, 62_379])
}

#[test]
fn test_divide_sums_to_perft() -> anyhow::Result<()> {
    let (generator, mut board) = setup(KIWIPETE)?;
    let divide = generator.divide(&mut board, 2);
    assert_eq!(divide.moves.len(), 48);
    assert_eq!(divide.total, 2039);
    assert_eq!(divide.moves.iter().map(|(_, n)| n).sum::<u64>(), divide.total);

    let castle = divide
        .moves
        .iter()
        .find(|(mv, _)| mv.to_string() == "e1g1")
        .map(|(_, n)| *n);
    assert_eq!(castle, Some(43));
    Ok(())
}

#[test]
fn test_perft_depth_zero_is_one() -> anyhow::Result<()> {
    let (generator, mut board) = setup(START_FEN)?;
    assert_eq!(generator.perft(&mut board, 0), 1);
    Ok(())
}
