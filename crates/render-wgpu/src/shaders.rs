/// Lit, textured mesh shader. Used by the opaque and blended pipelines.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    dir_light_dir: vec4<f32>,
    dir_light_color: vec4<f32>,
    point_pos: vec4<f32>,
    point_color: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    base_color: vec4<f32>,
    params: vec4<f32>,
    uv_repeat: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var shadow_map: texture_depth_2d;
@group(0) @binding(2) var shadow_sampler: sampler_comparison;

@group(1) @binding(0) var<uniform> obj: Object;
@group(1) @binding(1) var color_map: texture_2d<f32>;
@group(1) @binding(2) var color_sampler: sampler;
@group(1) @binding(3) var displacement_map: texture_2d<f32>;
@group(1) @binding(4) var displacement_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let height = textureSampleLevel(
        displacement_map,
        displacement_sampler,
        vertex.uv * obj.uv_repeat.zw,
        0.0,
    ).r;
    let displaced = vertex.position + vertex.normal * height * obj.params.z;
    let world_pos = obj.model * vec4<f32>(displaced, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((obj.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv * obj.uv_repeat.xy;
    return out;
}

fn shadow_factor(world_pos: vec3<f32>) -> f32 {
    if frame.dir_light_dir.w < 0.5 || obj.params.w < 0.5 {
        return 1.0;
    }
    let clip = frame.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0 {
        return 1.0;
    }
    let texel = 1.0 / f32(textureDimensions(shadow_map).x);
    let depth = ndc.z - frame.dir_light_color.w;
    var lit = 0.0;
    for (var x = -1; x <= 1; x++) {
        for (var y = -1; y <= 1; y++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

fn specular(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>, roughness: f32) -> f32 {
    let h = normalize(l + v);
    let a = max(roughness * roughness, 0.02);
    let shininess = 2.0 / (a * a) - 2.0;
    return pow(max(dot(n, h), 0.0), max(shininess, 1.0)) * (1.0 - roughness) * 0.5;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(color_map, color_sampler, in.uv);
    let albedo = obj.base_color.rgb * texel.rgb;
    let roughness = obj.params.x;
    let metalness = obj.params.y;

    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let diffuse_color = albedo * (1.0 - metalness);
    let spec_color = mix(vec3<f32>(0.04), albedo, metalness);

    var color = frame.ambient.rgb * diffuse_color;

    let l = -normalize(frame.dir_light_dir.xyz);
    let ndl = max(dot(n, l), 0.0);
    let shadow = shadow_factor(in.world_pos);
    color += frame.dir_light_color.rgb * shadow * ndl
        * (diffuse_color + spec_color * specular(n, l, v, roughness));

    let to_point = frame.point_pos.xyz - in.world_pos;
    let dist = length(to_point);
    let pl = to_point / max(dist, 1e-4);
    var falloff = 1.0 / max(pow(dist, frame.point_color.w), 0.01);
    if frame.point_pos.w > 0.0 {
        let ratio = clamp(1.0 - pow(dist / frame.point_pos.w, 4.0), 0.0, 1.0);
        falloff *= ratio * ratio;
    }
    let ndp = max(dot(n, pl), 0.0);
    color += frame.point_color.rgb * falloff * ndp
        * (diffuse_color + spec_color * specular(n, pl, v, roughness));

    return vec4<f32>(color, obj.base_color.a * texel.a);
}
"#;

/// Depth-only pass from the directional light.
pub const SHADOW_SHADER: &str = r#"
struct ShadowFrame {
    light_view_proj: mat4x4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    base_color: vec4<f32>,
    params: vec4<f32>,
    uv_repeat: vec4<f32>,
};

@group(0) @binding(0) var<uniform> shadow_frame: ShadowFrame;
@group(1) @binding(0) var<uniform> obj: Object;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return shadow_frame.light_view_proj * obj.model * vec4<f32>(position, 1.0);
}
"#;

/// Unlit colored lines for the light helpers.
pub const LINE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = frame.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;
