extern crate clap;
extern crate mandelzoom;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelzoom::layout::{confirm, DEFAULT_ROOT};
use mandelzoom::{
    assemble, Assembly, Codec, ComplexValue, FfmpegEncoder, FrameScheduler, GradientTable, Layout,
    MovieSpec, Real, ZoomError,
};
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const CENTER: &str = "center";
const FROM: &str = "from";
const TO: &str = "to";
const RATIO: &str = "ratio";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const GRADIENT: &str = "gradient";
const CODEC: &str = "codec";
const FPS: &str = "fps";
const THREADS: &str = "threads";
const DATA: &str = "data";
const OUTPUT: &str = "output";
const PRECISION: &str = "precision";
const PURGE: &str = "purge";
const KEEP: &str = "keep";
const FRAMES_ONLY: &str = "frames-only";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelzoom")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders a resumable zoom into the Mandelbrot set and assembles it into a video")
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.26222162762384535,-0.04591700163513885")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Point the zoom converges on, as re,im"),
        )
        .arg(
            Arg::with_name(FROM)
                .long(FROM)
                .takes_value(true)
                .default_value("0.001")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        std::f64::MAX,
                        "Could not parse scale",
                        "Scale must be positive",
                    )
                })
                .help("Plane units per pixel in the first frame"),
        )
        .arg(
            Arg::with_name(TO)
                .long(TO)
                .takes_value(true)
                .default_value("1e-16")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        std::f64::MAX,
                        "Could not parse scale",
                        "Scale must be positive",
                    )
                })
                .help("Zoom stops once the scale falls below this"),
        )
        .arg(
            Arg::with_name(RATIO)
                .long(RATIO)
                .short("r")
                .takes_value(true)
                .default_value("0.95")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse scale ratio",
                        "Scale ratio must be between 0 and 1",
                    )
                })
                .help("Scale multiplier from one frame to the next"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1920x1080")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse frame size"))
                .help("Size of each frame"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Iterations before a point is considered inside the set"),
        )
        .arg(
            Arg::with_name(GRADIENT)
                .long(GRADIENT)
                .short("g")
                .takes_value(true)
                .use_delimiter(true)
                .number_of_values(3)
                .default_value("1,50,70")
                .validator(|s| match f64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Gradient must be hue-step,saturation,value".to_string()),
                })
                .help("Hue step in degrees, saturation and value in percent"),
        )
        .arg(
            Arg::with_name(CODEC)
                .long(CODEC)
                .takes_value(true)
                .default_value("mp4v")
                .validator(|s| Codec::from_str(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Video codec fourcc: mp4v, avc1 or mjpg"),
        )
        .arg(
            Arg::with_name(FPS)
                .long(FPS)
                .takes_value(true)
                .default_value("30")
                .validator(|s| {
                    validate_range(
                        &s,
                        1.0,
                        1000.0,
                        "Could not parse frame rate",
                        "Frame rate must be between 1 and 1000",
                    )
                })
                .help("Frame rate of the video"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse thread count",
                        "Thread count must be between 1 and 1024",
                    )
                })
                .help("Frames rendered at once [default: number of CPUs]"),
        )
        .arg(
            Arg::with_name(DATA)
                .long(DATA)
                .short("d")
                .takes_value(true)
                .default_value(DEFAULT_ROOT)
                .help("Data directory for frames and the video"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("movie.mp4")
                .help("Video file name, inside the data directory"),
        )
        .arg(
            Arg::with_name(PRECISION)
                .long(PRECISION)
                .short("p")
                .takes_value(true)
                .possible_values(&["32", "64"])
                .default_value("64")
                .help("Width in bits of the floating point type"),
        )
        .arg(
            Arg::with_name(PURGE)
                .long(PURGE)
                .conflicts_with(KEEP)
                .help("Erase previously computed frames without asking"),
        )
        .arg(
            Arg::with_name(KEEP)
                .long(KEEP)
                .help("Keep previously computed frames without asking"),
        )
        .arg(
            Arg::with_name(FRAMES_ONLY)
                .long(FRAMES_ONLY)
                .help("Render frames but do not assemble the video"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, ZoomError> {
    let raw = matches.value_of(name).unwrap_or_default();
    T::from_str(raw)
        .map_err(|_| ZoomError::Config(format!("Could not parse --{} {:?}", name, raw)))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prepare(matches: &ArgMatches, layout: &Layout) -> Result<(), ZoomError> {
    layout.create()?;
    let purge = if matches.is_present(PURGE) {
        true
    } else if matches.is_present(KEEP) {
        false
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        confirm(
            "Erase previously computed frames?",
            &mut stdin.lock(),
            &mut stdout.lock(),
        )
        .map_err(|e| ZoomError::Io {
            path: "<stdin>".to_string(),
            cause: e,
        })?
    };
    if purge {
        info!("Erasing previously computed frames");
        layout.purge()?;
        layout.create()?;
    }
    Ok(())
}

fn zoom<T: Real>(matches: &ArgMatches, layout: &Layout) -> Result<(), ZoomError> {
    let center = parse_pair::<T>(matches.value_of(CENTER).unwrap_or_default(), ',')
        .map(|(re, im)| ComplexValue::new(re, im))
        .ok_or_else(|| ZoomError::Config("Could not parse center point".to_string()))?;
    let size = parse_pair::<u16>(matches.value_of(SIZE).unwrap_or_default(), 'x')
        .ok_or_else(|| ZoomError::Config("Could not parse frame size".to_string()))?;
    let gradient: Vec<f64> = matches
        .values_of(GRADIENT)
        .map(|values| values.filter_map(|v| f64::from_str(v).ok()).collect())
        .unwrap_or_default();
    let (hue_step, saturation, brightness) = match gradient.as_slice() {
        &[hue_step, saturation, brightness] => (hue_step, saturation, brightness),
        _ => return Err(ZoomError::Config("Could not parse gradient".to_string())),
    };
    let threads = match matches.value_of(THREADS) {
        Some(_) => value::<usize>(matches, THREADS)?,
        None => num_cpus::get(),
    };

    let spec = MovieSpec::new(
        center,
        value::<T>(matches, FROM)?,
        value::<T>(matches, TO)?,
        value::<T>(matches, RATIO)?,
        size.0,
        size.1,
        value::<u32>(matches, ITERATIONS)?,
    )?;
    let gradient = GradientTable::build(hue_step, saturation, brightness)?;
    info!(
        frames = spec.frame_count(),
        center = %spec.center(),
        gradient = gradient.len(),
        "Movie planned"
    );

    FrameScheduler::new(&spec, &gradient, layout, threads)?.run()?;
    if matches.is_present(FRAMES_ONLY) {
        return Ok(());
    }

    let movie = layout.movie_path(matches.value_of(OUTPUT).unwrap_or("movie.mp4"));
    let codec = value::<Codec>(matches, CODEC)?;
    let fps = value::<f64>(matches, FPS)?;
    match assemble(&FfmpegEncoder::new(), &spec, layout, &movie, codec, fps)? {
        Assembly::Completed(frames) => {
            info!(frames, path = %movie.display(), "Movie written");
        }
        Assembly::WriterUnavailable => {
            eprintln!("Could not open the video writer; the rendered frames are kept.");
        }
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), ZoomError> {
    let layout = Layout::new(Path::new(matches.value_of(DATA).unwrap_or(DEFAULT_ROOT)));
    info!(root = %layout.root().display(), "Data directory");
    prepare(matches, &layout)?;
    match matches.value_of(PRECISION) {
        Some("32") => zoom::<f32>(matches, &layout),
        _ => zoom::<f64>(matches, &layout),
    }
}

fn main() {
    init_tracing();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
