//! Fixtures shared by the unit tests.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zip::write::FileOptions;
use zip::CompressionMethod;

pub const SUMMARY_RATIOS_FILE: &str = "FFIEC CDR UBPR Ratios Summary Ratios 12312022.txt";
pub const INTEREST_RATE_RISK_FILE: &str =
    "FFIEC CDR UBPR Ratios Interest Rate Risk Analysis 12312022.txt";

/// Number of mid-sized filler banks, enough to push the small bank out of a top 50.
const FILLER_BANKS: u64 = 50;
const FILLER_RSSD_BASE: u64 = 9_000_000;

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ubpr_loader=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// FDIC-style institutions export.
pub fn institutions_csv() -> String {
    let mut csv = String::from(
        "FED_RSSD,NAME,ASSET,DEP,CERT,INACTIVE,STALP\n\
         480228,\"Bank of America, National Association\",2418508000,2042255000,3510,0,NC\n\
         802866,Silicon Valley Bank,209026000,173109000,24735,0,CA\n\
         852218,\"JPMorgan Chase Bank, National Association\",3201942000,2440722000,628,0,OH\n\
         1234567,Closed Savings Bank,5000000000,4000000000,99999,1,NY\n\
         476810,\"Citibank, National Association\",1766752000,1399631000,7213,0,SD\n\
         3150447,\"Charles Schwab Bank, SSB\",399427000,365021000,57450,0,TX\n\
         451965,\"Wells Fargo Bank, National Association\",1717531000,1387940000,3511,0,SD\n\
         3284070,Small Community Bank,512000,430000,31234,0,KS\n",
    );
    for n in 0..FILLER_BANKS {
        let _ = writeln!(
            csv,
            "{},Filler Bank {n},{},{},{},0,IA",
            FILLER_RSSD_BASE + n,
            1_000_000 + n * 1_000,
            900_000 + n * 1_000,
            80_000 + n
        );
    }
    csv
}

/// Summary ratios schedule, including the regulator's description row.
pub fn summary_ratios() -> String {
    let mut text = String::from(
        "\"ID RSSD\"\t\"Reporting Period\"\t\"UBPRE567\"\t\"UBPRE568\"\t\"UBPRE569\"\n\
         \t\t\"OFF BALANCE SHEET/OVERALL RISK INDICATORS\"\t\"UNREALIZED APPN/DEPN/OVERALL RISK INDICATORS\"\t\"UNREAL APP/DEP % TIER ONE CAP/OVERALL RISK INDICATORS\"\n\
         852218\t12/31/2022\t0.5\t-1.2\t-29.54\n\
         480228\t12/31/2022\t0.31\t-5.81\t-59.95\n\
         476810\t12/31/2022\t0.77\t-1.02\t-19.8\n\
         451965\t12/31/2022\t0.12\t-2.15\t-21.3\n\
         802866\t12/31/2022\t\t-7.76\t-89.2\n\
         3150447\t12/31/2022\t0.05\t-4.3\t-46.87\n\
         3284070\t12/31/2022\t0.01\t-9.9\t-95.1\n\
         7777777\t12/31/2022\t0.2\t-0.4\t-10.0\n",
    );
    for n in 0..FILLER_BANKS {
        let _ = writeln!(
            text,
            "{}\t12/31/2022\t0.1\t-0.1\t{:.1}",
            FILLER_RSSD_BASE + n,
            -(n as f64) / 10.0
        );
    }
    text
}

/// Interest rate risk schedule with an extra column nobody asks for.
pub fn interest_rate_risk() -> String {
    "ID RSSD\tUBPRM036\tUBPRM037\n\
     852218\t1.1\t-3.1\n\
     480228\t2.2\t-2.0\n\
     476810\t3.3\t-1.5\n\
     451965\t4.4\t-2.6\n\
     802866\t5.5\t-8.86\n\
     3150447\t6.6\t-8.17\n\
     3284070\t7.7\t-12.4\n"
        .to_string()
}

pub fn write_zip_archive(path: &Path, files: &[(&str, &str)]) {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

pub fn write_directory_archive(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

/// Writes the two-schedule archive used by the query tests.
pub fn scenario_zip(dir: &Path) -> PathBuf {
    let path = dir.join("ubpr.zip");
    let summary = summary_ratios();
    let rate_risk = interest_rate_risk();
    write_zip_archive(
        &path,
        &[
            ("Readme.txt", "UBPR bulk data"),
            (SUMMARY_RATIOS_FILE, &summary),
            (INTEREST_RATE_RISK_FILE, &rate_risk),
        ],
    );
    path
}

pub fn institutions_csv_file(dir: &Path) -> PathBuf {
    let path = dir.join("fdic_institutions.csv");
    std::fs::write(&path, institutions_csv()).unwrap();
    path
}
