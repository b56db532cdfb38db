use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use log::error;

use comp40_codec::error::CodecError;
use comp40_codec::pipeline;
use comp40_codec::ppm;
use comp40_codec::wire;

const OUTPUT_DENOMINATOR: u16 = 255;

#[derive(Parser)]
#[command(name = "compress40", version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress"])))]
struct Args {
  // Compress a PPM image into a COMP40 compressed stream.
  #[arg(short = 'c', long)]
  compress: bool,

  // Decompress a COMP40 compressed stream into a PPM image.
  #[arg(short = 'd', long = "decompress")]
  decompress: bool,

  // Input file; reads from stdin if omitted.
  file: Option<String>,

  // Increase log verbosity (-v, -vv).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn open_input(path: &Option<String>) -> io::Result<Box<dyn Read>> {
  match path {
    Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
    None => Ok(Box::new(BufReader::new(io::stdin()))),
  }
}

fn run(args: &Args) -> Result<(), CodecError> {
  let mut input = open_input(&args.file)?;
  let stdout = io::stdout();
  let mut output = BufWriter::new(stdout.lock());

  if args.compress {
    let image = ppm::read_ppm(&mut input)?;
    let (width, height, words, _stats) = pipeline::compress(&image);
    wire::write_codewords(&mut output, width, height, &words)?;
  } else {
    let (_width, _height, words) = wire::read_codewords(&mut input)?;
    let image = pipeline::decompress(&words, OUTPUT_DENOMINATOR);
    ppm::write_ppm(&mut output, &image)?;
  }

  output.flush()?;
  Ok(())
}

fn main() -> ExitCode {
  let args = Args::parse();

  let level = match args.verbose {
    0 => log::LevelFilter::Info,
    1 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };
  env_logger::Builder::new().filter_level(level).init();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    }
  }
}
