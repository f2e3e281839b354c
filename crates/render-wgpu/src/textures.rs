use cottage_assets::{ColorSpace, Sampling, TextureId, TextureImage, TextureState, TextureStore, WrapMode};
use std::collections::{BTreeMap, BTreeSet};
use wgpu::util::DeviceExt;

pub(crate) struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// GPU copies of decoded textures, plus the fallbacks used while a handle is
/// pending or after it failed.
pub(crate) struct GpuTextures {
    uploaded: BTreeMap<TextureId, GpuTexture>,
    /// Ready textures that could not be uploaded; they keep the fallback.
    rejected: BTreeSet<TextureId>,
    /// Color maps fall back to white (untextured).
    pub white: GpuTexture,
    /// Displacement maps fall back to black (flat).
    pub black: GpuTexture,
}

impl GpuTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            uploaded: BTreeMap::new(),
            rejected: BTreeSet::new(),
            white: upload(
                device,
                queue,
                "white_texture",
                &TextureImage::solid([255; 4]),
                &Sampling::default(),
            ),
            black: upload(
                device,
                queue,
                "black_texture",
                &TextureImage::solid([0, 0, 0, 255]),
                &Sampling::data(),
            ),
        }
    }

    /// Upload every ready texture not yet on the GPU. Returns true if any
    /// new texture became available.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, store: &TextureStore) -> bool {
        let max_dim = device.limits().max_texture_dimension_2d;
        let mut changed = false;
        for (id, entry) in store.iter() {
            if self.uploaded.contains_key(id) || self.rejected.contains(id) {
                continue;
            }
            let TextureState::Ready(image) = &entry.state else {
                continue;
            };
            let label = entry.path.display().to_string();
            match image.fit_within(max_dim) {
                Ok(fitted) => {
                    self.uploaded
                        .insert(*id, upload(device, queue, &label, &fitted, &entry.sampling));
                    tracing::debug!("uploaded texture {label} ({}x{})", fitted.width, fitted.height);
                    changed = true;
                }
                Err(e) => {
                    tracing::error!("texture {label} not uploaded: {e}");
                    self.rejected.insert(*id);
                }
            }
        }
        changed
    }

    /// The uploaded texture for `id`, or `fallback` while it is unavailable.
    pub fn get_or<'a>(&'a self, id: Option<TextureId>, fallback: &'a GpuTexture) -> &'a GpuTexture {
        id.and_then(|id| self.uploaded.get(&id)).unwrap_or(fallback)
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
    sampling: &Sampling,
) -> GpuTexture {
    let format = match sampling.color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width.max(1),
                height: image.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );

    let address_mode = match sampling.wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
    };
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture {
        view: texture.create_view(&Default::default()),
        sampler,
    }
}
