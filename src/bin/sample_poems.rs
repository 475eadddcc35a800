use std::env;
use std::process::ExitCode;

use indicatif::ProgressBar;
use seqgan_poem::rng::rng_from_seed;
use seqgan_poem::{Generator, GeneratorConfig, GeneratorError, TokenBatch};

struct Args {
    config: Option<String>,
    batch_size: usize,
    seq_len: usize,
    batches: usize,
    prefix: Option<Vec<usize>>,
}

/// Parses `[config] [--batch N] [--seq-len N] [--batches N] [--prefix 1,2,3]`.
/// Every prefix id must parse; a malformed one is reported rather than
/// dropped.
fn parse_cli<I>(mut args: I) -> Result<Args, String>
where
    I: Iterator<Item = String>,
{
    let mut parsed = Args {
        config: None,
        batch_size: 4,
        seq_len: 20,
        batches: 1,
        prefix: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--batch" => {
                if let Some(n) = args.next() {
                    parsed.batch_size = n.parse().unwrap_or(parsed.batch_size);
                }
            }
            "--seq-len" => {
                if let Some(n) = args.next() {
                    parsed.seq_len = n.parse().unwrap_or(parsed.seq_len);
                }
            }
            "--batches" => {
                if let Some(n) = args.next() {
                    parsed.batches = n.parse().unwrap_or(parsed.batches);
                }
            }
            "--prefix" => {
                if let Some(list) = args.next() {
                    let ids = list
                        .split(',')
                        .map(|s| {
                            s.trim()
                                .parse::<usize>()
                                .map_err(|_| format!("invalid prefix token id {:?}", s.trim()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    parsed.prefix = Some(ids);
                }
            }
            _ => parsed.config = Some(arg),
        }
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match parse_cli(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_path(path).unwrap_or_else(|| {
            log::warn!("falling back to the default generator config");
            GeneratorConfig::default()
        }),
        None => GeneratorConfig::default(),
    };

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("sampling failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &GeneratorConfig, args: &Args) -> Result<(), GeneratorError> {
    let mut rng = rng_from_seed(config.seed);
    let generator = Generator::with_rng(
        config.vocab_size,
        config.embedding_dim,
        config.hidden_dim,
        config.use_cuda,
        &mut rng,
    )?;
    let prefix = match &args.prefix {
        Some(ids) => Some(TokenBatch::from_rows(&vec![ids.clone(); args.batch_size])?),
        None => None,
    };

    let pb = ProgressBar::new(args.batches as u64);
    for batch in 0..args.batches {
        let samples = generator.sample(args.batch_size, args.seq_len, prefix.as_ref(), &mut rng)?;
        for row in samples.to_rows() {
            let line: Vec<String> = row.iter().map(|t| t.to_string()).collect();
            pb.println(line.join(" "));
        }
        pb.set_message(format!("batch {}", batch + 1));
        pb.inc(1);
    }
    pb.finish_with_message("sampling done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_config() {
        let args = parse_cli(
            ["gen.toml", "--batch", "2", "--seq-len", "5", "--prefix", "1, 2"]
                .iter()
                .map(|s| s.to_string()),
        )
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("gen.toml"));
        assert_eq!(args.batch_size, 2);
        assert_eq!(args.seq_len, 5);
        assert_eq!(args.batches, 1);
        assert_eq!(args.prefix, Some(vec![1, 2]));
    }

    #[test]
    fn bad_numbers_keep_defaults() {
        let args = parse_cli(["--batch", "many"].iter().map(|s| s.to_string())).unwrap();
        assert_eq!(args.batch_size, 4);
        assert!(args.config.is_none());
    }

    #[test]
    fn malformed_prefix_id_is_an_error() {
        let err = parse_cli(["--prefix", "1,x,3"].iter().map(|s| s.to_string()))
            .err()
            .unwrap();
        assert!(err.contains("\"x\""), "{err}");
    }
}
