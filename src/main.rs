use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use clap::Parser;
use recap::Recap;
use serde::Deserialize;
use stacker::{Cell, Kind, KindSource, RandomKinds, Sequence, Session, Status};
use tap::Pipe;

#[derive(Debug, Parser)]
#[command(about, override_usage = "stacker [OPTIONS] < script.txt")]
struct Args {
    /// Seed for the piece generator, for reproducible games
    #[arg(long)]
    seed: Option<u64>,
    /// Cycle through these pieces instead of drawing at random, e.g. I,O,T
    #[arg(long, value_delimiter = ',')]
    pieces: Vec<Kind>,
    /// File holding the best score, read at startup and rewritten when beaten
    #[arg(long, value_name = "PATH")]
    best_score_file: Option<PathBuf>,
    /// Print the playfield after each script
    #[arg(long)]
    render: bool,
}

impl Args {
    fn kind_source(&self) -> anyhow::Result<Box<dyn KindSource>> {
        if !self.pieces.is_empty() {
            return Ok(Box::new(Sequence::new(self.pieces.iter().copied())?));
        }
        Ok(match self.seed {
            Some(seed) => Box::new(RandomKinds::seeded(seed)),
            None => Box::new(RandomKinds::from_entropy()),
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut best = match &args.best_score_file {
        Some(path) => load_best_score(path),
        None => 0,
    };
    for line in io::stdin().lines() {
        let steps = parse_line(&line.context("couldn't read line from stdin")?)
            .context("couldn't parse line")?;
        let mut session: Session<10, 20, _> = Session::new(args.kind_source()?);
        run(&mut session, &steps);
        println!("{}", summary(&session));
        if args.render {
            print!("{}", render(&session.display_grid()));
        }
        if session.score() > best {
            log::info!("new best score {}", session.score());
            best = session.score();
            if let Some(path) = &args.best_score_file {
                save_best_score(path, best)?;
            }
        }
    }
    if args.best_score_file.is_some() {
        println!("best={best}");
    }
    Ok(())
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Left,
    Right,
    Down,
    Rotate,
    Drop,
    Tick,
}

#[derive(Debug, Deserialize, Recap, PartialEq, Eq, Clone, Copy)]
#[recap(regex = r#"^(?P<command>[a-z]+)(\*(?P<repeat>\d+))?$"#)]
struct Step {
    command: Command,
    repeat: Option<usize>,
}

impl Step {
    fn times(&self) -> usize {
        self.repeat.unwrap_or(1)
    }
}

fn parse_line(s: &str) -> anyhow::Result<Vec<Step>> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Step::from_str(token).with_context(|| format!("bad step {token:?}")))
        .collect()
}

fn apply<S: KindSource>(session: &mut Session<10, 20, S>, command: Command) -> Status {
    match command {
        Command::Start => session.start(),
        Command::Pause => session.pause(),
        Command::Resume => session.resume(),
        Command::Reset => session.reset(),
        Command::Left => session.move_left(),
        Command::Right => session.move_right(),
        Command::Down => session.move_down(),
        Command::Rotate => session.rotate(),
        Command::Drop => session.hard_drop(),
        Command::Tick => session.tick(),
    }
}

fn run<S: KindSource>(session: &mut Session<10, 20, S>, steps: &[Step]) {
    for step in steps {
        for _ in 0..step.times() {
            let status = apply(session, step.command);
            log::trace!("{:?} -> {status:?}", step.command);
        }
    }
}

fn summary<S: KindSource>(session: &Session<10, 20, S>) -> String {
    format!(
        "score={} level={} lines={} {}",
        session.score(),
        session.level(),
        session.lines(),
        session.phase()
    )
}

fn render<const WIDTH: usize, const HEIGHT: usize>(grid: &[[Cell; WIDTH]; HEIGHT]) -> String {
    grid.iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Filled(_) => '#',
                })
                .chain(Some('\n'))
                .collect::<String>()
        })
        .collect()
}

/// A missing or garbled file counts as no best score yet.
fn load_best_score(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| content.trim().parse().ok())
        .unwrap_or(0)
}

fn save_best_score(path: &Path, best: u64) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("couldn't create {}", parent.display()))?;
    }
    format!("{best}\n")
        .pipe(|content| fs::write(path, content))
        .with_context(|| format!("couldn't write best score to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Command::{Drop, Left, Right, Start, Tick};

    fn session_of(kinds: impl IntoIterator<Item = Kind>) -> anyhow::Result<Session<10, 20, Sequence>> {
        Ok(Session::new(Sequence::new(kinds)?))
    }

    #[test]
    fn parse1() -> anyhow::Result<()> {
        assert_eq!(
            parse_line("start,left*4,drop")?,
            vec![
                Step {
                    command: Start,
                    repeat: None
                },
                Step {
                    command: Left,
                    repeat: Some(4)
                },
                Step {
                    command: Drop,
                    repeat: None
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_tolerates_spaces_and_blank_lines() -> anyhow::Result<()> {
        assert_eq!(parse_line("")?, vec![]);
        assert_eq!(parse_line(" tick , tick ")?.len(), 2);
        Ok(())
    }

    #[test]
    fn parse_rejects_unknown_commands() {
        assert!(parse_line("start,jump").is_err());
        assert!(parse_line("left*").is_err());
    }

    #[test]
    fn bottom_row_clear() -> anyhow::Result<()> {
        let mut session = session_of([Kind::I, Kind::I, Kind::O])?;
        run(&mut session, &parse_line("start,left*4,drop,drop,right*4,drop")?);
        assert_eq!(summary(&session), "score=100 level=1 lines=1 playing");
        Ok(())
    }

    #[test]
    fn steps_run_in_order() -> anyhow::Result<()> {
        let mut session = session_of([Kind::O])?;
        run(
            &mut session,
            &[
                Step {
                    command: Start,
                    repeat: None,
                },
                Step {
                    command: Right,
                    repeat: Some(9),
                },
                Step {
                    command: Tick,
                    repeat: Some(3),
                },
            ],
        );
        let position = session.active().map(|piece| piece.position);
        assert_eq!(position, Some(stacker::Position::new(8, 3)));
        Ok(())
    }

    #[test]
    fn render_marks_filled_cells() {
        let field: stacker::Playfield<3, 2> = stacker::grid![
            [. T .],
            [T T T],
        ];
        assert_eq!(render(field.rows()), ".#.\n###\n");
    }

    #[test]
    fn missing_best_score_is_zero() {
        assert_eq!(load_best_score(Path::new("/definitely/not/here")), 0);
    }
}
