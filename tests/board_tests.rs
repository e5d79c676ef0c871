use std::sync::Arc;

use perch::board::{FIFTY_MOVE_HALFMOVES, START_FEN};
use perch::{AttackTables, Board, FenError, MoveGenerator, ZobristKeys};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn generator() -> MoveGenerator {
    MoveGenerator::new(Arc::new(AttackTables::new()))
}

fn position(fen: &str) -> anyhow::Result<Board> {
    Ok(Board::from_fen(fen, Arc::new(ZobristKeys::default()))?)
}

fn play(generator: &MoveGenerator, board: &mut Board, moves: &[&str]) -> anyhow::Result<()> {
    for text in moves {
        let mv = generator.find_move(board, text)?;
        board.make_move(mv);
    }
    Ok(())
}

#[test]
fn test_random_playouts_unwind_exactly() -> anyhow::Result<()> {
    let generator = generator();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for fen in [START_FEN, KIWIPETE] {
        for _ in 0..20 {
            let mut board = position(fen)?;
            let mut snapshots = vec![board.clone()];
            let mut played = Vec::new();

            for _ in 0..80 {
                let moves = generator.legal_moves(&mut board);
                let Some(&mv) = moves.choose(&mut rng) else {
                    break;
                };
                board.make_move(mv);
                assert_eq!(board.hash(), board.compute_hash(), "hash drift after {mv}");
                assert!(!generator.in_check(&board, board.side_to_move().opposite()));
                played.push(mv);
                snapshots.push(board.clone());
            }

            while let Some(mv) = played.pop() {
                snapshots.pop();
                board.unmake_move(mv);
                let expected = snapshots.last().unwrap();
                assert_eq!(&board, expected, "unmake of {mv} did not restore the position");
                assert_eq!(board.hash(), expected.hash());
            }
            assert_eq!(board.to_fen(), fen);
        }
    }
    Ok(())
}

#[test]
fn test_fen_round_trips_after_moves() -> anyhow::Result<()> {
    let generator = generator();
    let mut board = position(START_FEN)?;
    play(&generator, &mut board, &["e2e4", "d7d5", "e4e5", "f7f5"])?;
    let fen = board.to_fen();
    assert_eq!(fen, "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");

    let reparsed = position(&fen)?;
    assert_eq!(reparsed, board);
    assert_eq!(reparsed.hash(), board.hash());

    // The en passant capture is available and lands on f6
    let capture = generator.find_move(&mut board, "e5f6")?;
    assert!(capture.is_en_passant);
    Ok(())
}

#[test]
fn test_fifty_move_rule() -> anyhow::Result<()> {
    let generator = generator();
    let mut board = position("4k3/8/8/8/8/8/8/Q3K3 w - - 48 100")?;
    assert!(!board.is_drawn());
    play(&generator, &mut board, &["e1d2"])?;
    assert_eq!(board.halfmove_clock(), FIFTY_MOVE_HALFMOVES - 1);
    assert!(!board.is_drawn());
    play(&generator, &mut board, &["e8d7"])?;
    assert!(board.is_drawn());
    Ok(())
}

#[test]
fn test_repetition_is_a_draw() -> anyhow::Result<()> {
    let generator = generator();
    let mut board = position(START_FEN)?;
    play(&generator, &mut board, &["g1f3", "g8f6", "f3g1"])?;
    assert!(!board.is_drawn());
    play(&generator, &mut board, &["f6g8"])?;
    assert_eq!(board.repetitions(), 1);
    assert!(board.is_drawn());

    // Make and unmake leave the repetition count alone
    let last = generator.find_move(&mut board, "g1f3")?;
    board.make_move(last);
    board.unmake_move(last);
    assert!(board.is_drawn());
    Ok(())
}

#[test]
fn test_history_is_independent_of_move_counter() -> anyhow::Result<()> {
    let generator = generator();
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 6 40";
    let mut board = position(fen)?;
    assert_eq!(board.ply(), 78);
    // Only moves made on this board count toward repetition
    assert_eq!(board.repetitions(), 0);

    let mut played = Vec::new();
    for text in ["f3g1", "c6b8", "g1f3", "b8c6"] {
        let mv = generator.find_move(&mut board, text)?;
        board.make_move(mv);
        played.push(mv);
    }
    assert_eq!(board.repetitions(), 1);
    assert!(board.is_drawn());
    assert_eq!(board.ply(), 82);

    for mv in played.into_iter().rev() {
        board.unmake_move(mv);
    }
    assert_eq!(board.to_fen(), fen);
    assert_eq!(board.repetitions(), 0);
    Ok(())
}

#[test]
fn test_pawn_move_cuts_repetition_window() -> anyhow::Result<()> {
    let generator = generator();
    let mut board = position(START_FEN)?;
    play(&generator, &mut board, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e3"])?;
    assert_eq!(board.halfmove_clock(), 0);
    assert_eq!(board.repetitions(), 0);
    assert!(!board.is_drawn());
    Ok(())
}

#[test]
fn test_transposed_positions_share_a_hash() -> anyhow::Result<()> {
    let generator = generator();
    let mut first = position(START_FEN)?;
    let mut second = position(START_FEN)?;
    play(&generator, &mut first, &["g1f3", "g8f6", "b1c3"])?;
    play(&generator, &mut second, &["b1c3", "g8f6", "g1f3"])?;
    assert_eq!(first.hash(), second.hash());
    assert_eq!(first, second);

    // Same placement, different rights
    let with_rights = position(KIWIPETE)?;
    let without = position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w Kkq - 0 1")?;
    assert_ne!(with_rights.hash(), without.hash());
    Ok(())
}

#[test]
fn test_malformed_fen_is_rejected() {
    let keys = Arc::new(ZobristKeys::default());
    assert_eq!(
        Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1", keys.clone()).unwrap_err(),
        FenError::KingCount
    );
    assert_eq!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1", keys.clone()).unwrap_err(),
        FenError::InvalidSide("x".to_string())
    );
    assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1", keys.clone()).is_err());

    // En passant targets that do not follow from a double push
    for fen in [
        "4k3/8/8/8/8/8/3P4/4K3 w - e3 0 1",
        "4k3/8/8/3P4/8/8/8/4K3 w - e6 0 1",
        "4k3/8/8/8/3Pp3/8/8/4K3 w - e3 0 1",
    ] {
        assert!(
            matches!(Board::from_fen(fen, keys.clone()), Err(FenError::InvalidEnPassant(_))),
            "{fen}"
        );
    }
}

#[test]
fn test_en_passant_from_fen_captures_a_real_pawn() -> anyhow::Result<()> {
    let generator = generator();
    let mut board = position("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2")?;
    let capture = generator.find_move(&mut board, "d5e6")?;
    assert!(capture.is_en_passant);
    board.make_move(capture);
    assert_eq!(board.to_fen(), "4k3/8/4P3/8/8/8/8/4K3 b - - 0 2");
    assert_eq!(board.hash(), board.compute_hash());
    Ok(())
}
