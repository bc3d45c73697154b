//! Executable for creating a firmware file section from input files.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use gensec::{
    compress::UefiCompress,
    config::{parse_attribute, parse_compression_type, parse_section_type, parse_vendor_guid},
    sink::WriteSink,
    source::FileBlobSource,
    SectionConfig, SectionError, SectionGenerator, SectionRequest,
};
use gensec_pi::section::{CompressionType, GuidedSectionAttributes, Type};
use log::LevelFilter;
use r_efi::efi;

/// Create a firmware file section from the input files.
#[derive(Parser, Debug)]
#[command(name = "gensec", version)]
struct Args {
    /// Input files, in the order their content is placed in the section.
    input_files: Vec<String>,
    /// File to write the section to.
    #[arg(short = 'o', long = "outputfile")]
    output_file: PathBuf,
    /// Section type (EFI_SECTION_*). Without a type, the inputs are concatenated with no section header.
    #[arg(short = 's', long = "sectiontype", value_parser = parse_section_type)]
    section_type: Option<Type>,
    /// Compression of an EFI_SECTION_COMPRESSION section: PI_NONE or PI_STD (default).
    #[arg(short = 'c', long = "compress", value_parser = parse_compression_type)]
    compression: Option<CompressionType>,
    /// Vendor GUID of an EFI_SECTION_GUID_DEFINED section. Defaults to the CRC32 section GUID.
    #[arg(short = 'g', long = "vendor", value_parser = parse_vendor_guid)]
    vendor_guid: Option<efi::Guid>,
    /// Attribute of an EFI_SECTION_GUID_DEFINED section: PROCESSING_REQUIRED or AUTH_STATUS_VALID. Repeatable.
    #[arg(short = 'r', long = "attributes", value_parser = parse_attribute)]
    attributes: Vec<GuidedSectionAttributes>,
    /// Version string of an EFI_SECTION_VERSION section or name of an EFI_SECTION_USER_INTERFACE section.
    #[arg(short = 'n', long = "name")]
    name: Option<String>,
    /// Build number (0~9999) of an EFI_SECTION_VERSION section.
    #[arg(short = 'j', long = "buildnumber", allow_negative_numbers = true)]
    build_number: Option<i64>,
    /// Turn on verbose output with informational messages.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// Disable all messages except errors.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Enable debug messages at the given level (0~9).
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=9))]
    debug: Option<u8>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        match self.debug {
            Some(9) => LevelFilter::Trace,
            Some(_) => LevelFilter::Debug,
            None if self.verbose => LevelFilter::Info,
            None if self.quiet => LevelFilter::Error,
            None => LevelFilter::Warn,
        }
    }

    fn config(&self) -> SectionConfig {
        SectionConfig {
            section_type: self.section_type.unwrap_or(Type::All),
            compression_type: self.compression.unwrap_or(CompressionType::StandardCompression),
            vendor_guid: self.vendor_guid,
            attributes: self.attributes.iter().copied().fold(GuidedSectionAttributes::empty(), |all, flag| all | flag),
            name: self.name.clone(),
            build_number: self.build_number.unwrap_or(0),
            inputs: self.input_files.clone(),
        }
    }
}

fn write_section(args: &Args, config: &SectionConfig, request: &SectionRequest) -> Result<usize, SectionError> {
    log::info!("Output file name is {}", args.output_file.display());
    let file = File::create(&args.output_file).map_err(|err| {
        log::error!("Error opening file {}: {err}", args.output_file.display());
        SectionError::IoError
    })?;
    let mut sink = WriteSink::new(BufWriter::new(file));

    let source = FileBlobSource;
    let compressor = UefiCompress;
    let generator = SectionGenerator::new(&source).with_compressor(&compressor);
    let size = generator.generate(request, &config.input_names(), &mut sink)?;
    sink.into_inner()?;
    Ok(size)
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level()).format_timestamp(None).format_target(false).init();
    log::info!("gensec tool start.");

    let config = args.config();
    let result = config.to_request().and_then(|request| {
        write_section(&args, &config, &request).inspect_err(|_| {
            // Do not leave a partial section behind.
            if let Err(err) = fs::remove_file(&args.output_file) {
                log::warn!("Unable to remove {}: {err}", args.output_file.display());
            }
        })
    });

    match result {
        Ok(size) => {
            log::info!("Wrote {size} bytes to {}", args.output_file.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("gensec: error: {err}");
            ExitCode::FAILURE
        }
    }
}
