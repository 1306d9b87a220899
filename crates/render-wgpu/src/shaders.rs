/// WGSL shader for every scene primitive.
///
/// Lighting is Phong with three sources: one point light picked per instance
/// (start light or landmark light), the directional sun, and per-light ambient.
/// Point lights fall off with the square of distance.
pub const SCENE_SHADER: &str = r#"
struct Light {
    // xyz: position, or direction toward the light for the sun.
    position: vec4<f32>,
    // rgb: normalized color, a: intensity.
    color: vec4<f32>,
    // x: ambient strength, y: specular strength, z: phong exponent.
    params: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    track: Light,
    landmark: Light,
    sun: Light,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) slot: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) @interpolate(flat) slot: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.slot = instance.slot;
    return out;
}

fn phong(
    source: Light,
    to_light: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    falloff: f32,
) -> vec3<f32> {
    let color = source.color.rgb;
    let ambient = source.params.x * color;
    let diffuse = max(dot(normal, to_light), 0.0) * color;
    let reflected = reflect(-to_light, normal);
    let spec = pow(max(dot(reflected, view_dir), 0.1), source.params.z);
    let specular = source.params.y * spec * color;
    return (diffuse + specular) * source.color.a * falloff + ambient;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.slot > 1.5) {
        return in.color;
    }

    var point: Light;
    if (in.slot < 0.5) {
        point = uniforms.track;
    } else {
        point = uniforms.landmark;
    }

    // Quads are seen from both sides.
    var normal = normalize(in.world_normal);
    let view_dir = normalize(uniforms.eye.xyz - in.world_pos);
    if (dot(normal, view_dir) < 0.0) {
        normal = -normal;
    }

    let offset = point.position.xyz - in.world_pos;
    let dist = max(length(offset), 0.001);
    let point_lit = phong(point, offset / dist, normal, view_dir, 1.0 / (dist * dist));
    let sun_lit = phong(uniforms.sun, normalize(uniforms.sun.position.xyz), normal, view_dir, 1.0);

    return vec4<f32>(in.color.rgb * (point_lit + sun_lit), in.color.a);
}
"#;
