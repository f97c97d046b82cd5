// src/services/export_service.rs
// ExportService writes the final signature raster to disk as PNG or as
// a single-page PDF. Jobs are handed to a worker thread over a channel
// so encoding never blocks the event loop.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, Stream};
use nannou::image::RgbaImage;
use rayon::prelude::*;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Whitespace around the raster on the PDF page, in points.
const PAGE_MARGIN: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "png" => Some(ExportFormat::Png),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug)]
pub struct ExportJob {
    pub pixels: Vec<u8>, // RGBA8
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub stem: String,
}

pub struct ExportService {
    job_sender: Sender<ExportJob>,
    worker: Option<JoinHandle<()>>,
    shutdown_requested: Arc<AtomicBool>,
    jobs_pending: Arc<AtomicUsize>,
}

impl ExportService {
    pub fn new(output_dir: &str) -> Result<Self, Box<dyn Error>> {
        std::fs::create_dir_all(output_dir)?;

        let (sender, receiver) = channel();
        let shutdown_requested = Arc::new(AtomicBool::new(false));
        let jobs_pending = Arc::new(AtomicUsize::new(0));

        let thread_output_dir = output_dir.to_string();
        let shutdown = shutdown_requested.clone();
        let pending = jobs_pending.clone();

        let worker = thread::spawn(move || {
            Self::worker_loop(receiver, thread_output_dir, shutdown, pending);
        });

        Ok(Self {
            job_sender: sender,
            worker: Some(worker),
            shutdown_requested,
            jobs_pending,
        })
    }

    fn worker_loop(
        receiver: Receiver<ExportJob>,
        output_dir: String,
        shutdown_requested: Arc<AtomicBool>,
        jobs_pending: Arc<AtomicUsize>,
    ) {
        loop {
            // recv_timeout so shutdown requests are noticed while idle
            match receiver.recv_timeout(Duration::from_millis(50)) {
                Ok(job) => {
                    match process_job(&job, &output_dir) {
                        Ok(path) => println!("Exported {}", path),
                        Err(err) => eprintln!("Export failed: {}", err),
                    }
                    jobs_pending.fetch_sub(1, Ordering::SeqCst);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if shutdown_requested.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    pub fn export(&self, job: ExportJob) {
        self.jobs_pending.fetch_add(1, Ordering::SeqCst);
        if self.job_sender.send(job).is_err() {
            self.jobs_pending.fetch_sub(1, Ordering::SeqCst);
            eprintln!("Export worker is gone; job dropped");
        }
    }

    pub fn has_pending_jobs(&self) -> bool {
        self.jobs_pending.load(Ordering::SeqCst) > 0
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
    }
}

impl Drop for ExportService {
    fn drop(&mut self) {
        self.request_shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                eprintln!("Export worker panicked");
            }
        }
    }
}

fn process_job(job: &ExportJob, output_dir: &str) -> Result<String, Box<dyn Error>> {
    let file_name = find_next_output_filename(output_dir, &job.stem, job.format.extension());
    let path = Path::new(output_dir).join(&file_name);

    match job.format {
        ExportFormat::Png => save_png(job, &path)?,
        ExportFormat::Pdf => save_pdf(job, &path)?,
    }

    Ok(path.to_string_lossy().into_owned())
}

fn save_png(job: &ExportJob, path: &Path) -> Result<(), Box<dyn Error>> {
    let image = RgbaImage::from_raw(job.width, job.height, job.pixels.clone())
        .ok_or("raster buffer does not match its dimensions")?;
    image.save(path)?;
    Ok(())
}

fn save_pdf(job: &ExportJob, path: &Path) -> Result<(), Box<dyn Error>> {
    // PDF image space puts row 0 at the bottom, so rows are reversed.
    // Alpha is dropped: the canvas background is opaque by contract.
    let row_bytes = (job.width * 4) as usize;
    let rgb: Vec<u8> = job
        .pixels
        .par_chunks(row_bytes)
        .rev()
        .flat_map_iter(|row| {
            row.chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
        })
        .collect();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&rgb)?;
    let compressed = encoder.finish()?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => job.width as i64,
            "Height" => job.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed,
    ));

    let draw_ops = format!(
        "q\n{} 0 0 {} {} {} cm\n/Sig Do\nQ\n",
        job.width, job.height, PAGE_MARGIN, PAGE_MARGIN
    );
    let content_id = doc.add_object(Stream::new(dictionary! {}, draw_ops.into_bytes()));

    let page_width = (job.width as f32 + 2.0 * PAGE_MARGIN) as i64;
    let page_height = (job.height as f32 + 2.0 * PAGE_MARGIN) as i64;
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "MediaBox" => vec![0i64.into(), 0i64.into(), page_width.into(), page_height.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Sig" => Object::Reference(image_id) },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path)?;
    Ok(())
}

fn find_next_output_filename(output_dir: &str, stem: &str, extension: &str) -> String {
    let mut index = 0;

    loop {
        let file_name = if index == 0 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}{}.{}", stem, index, extension)
        };

        let path = Path::new(output_dir).join(&file_name);

        if !path.exists() {
            return file_name;
        }

        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_dir(name: &str) -> String {
        let dir = std::env::temp_dir()
            .join(format!("paraph-export-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.to_string_lossy().into_owned()
    }

    fn white_raster(width: u32, height: u32) -> Vec<u8> {
        vec![255; (width * height * 4) as usize]
    }

    #[test]
    fn test_png_job_writes_a_file() {
        let dir = test_dir("png");
        {
            let service = ExportService::new(&dir).unwrap();
            service.export(ExportJob {
                pixels: white_raster(20, 10),
                width: 20,
                height: 10,
                format: ExportFormat::Png,
                stem: "signature".to_string(),
            });
            // Dropping the service drains the queue before joining.
        }
        let data = fs::read(Path::new(&dir).join("signature.png")).unwrap();
        assert_eq!(&data[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_pdf_job_writes_a_document() {
        let dir = test_dir("pdf");
        {
            let service = ExportService::new(&dir).unwrap();
            service.export(ExportJob {
                pixels: white_raster(16, 8),
                width: 16,
                height: 8,
                format: ExportFormat::Pdf,
                stem: "signature".to_string(),
            });
        }
        let data = fs::read(Path::new(&dir).join("signature.pdf")).unwrap();
        assert_eq!(&data[..5], b"%PDF-");
    }

    #[test]
    fn test_output_filenames_never_collide() {
        let dir = test_dir("names");
        assert_eq!(find_next_output_filename(&dir, "signature", "png"), "signature.png");

        fs::write(Path::new(&dir).join("signature.png"), b"x").unwrap();
        assert_eq!(
            find_next_output_filename(&dir, "signature", "png"),
            "signature1.png"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::parse("png"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("webp"), None);
    }
}
